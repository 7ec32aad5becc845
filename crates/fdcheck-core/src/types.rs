use serde::{Deserialize, Serialize};
use std::fmt;

/// One process as observed at sampling time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub name: String,
    pub pid: i32,
    pub open_files: u64,
}

impl ProcessRecord {
    pub fn new(name: impl Into<String>, pid: i32, open_files: u64) -> Self {
        Self {
            name: name.into(),
            pid,
            open_files,
        }
    }

    // Exact, case-sensitive name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Thresholds derived once per run from the descriptor ceiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Soft RLIMIT_NOFILE value
    pub max_open_files: u64,
    pub critical_ratio: f64,
    pub warning_ratio: f64,
}

impl Thresholds {
    pub fn new(max_open_files: u64, critical_ratio: f64, warning_ratio: f64) -> Self {
        Self {
            max_open_files,
            critical_ratio,
            warning_ratio,
        }
    }

    pub fn critical_value(&self) -> f64 {
        self.max_open_files as f64 * self.critical_ratio
    }

    pub fn warning_value(&self) -> f64 {
        self.max_open_files as f64 * self.warning_ratio
    }

    /// True when the ratios satisfy `0 <= warning <= critical <= 1`.
    ///
    /// Not enforced anywhere; callers only use it to log a warning.
    pub fn is_consistent(&self) -> bool {
        0.0 <= self.warning_ratio
            && self.warning_ratio <= self.critical_ratio
            && self.critical_ratio <= 1.0
    }
}

/// Check result, mapped onto monitoring plugin exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn exit_code(&self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== ProcessRecord Tests =====

    #[test]
    fn test_process_record_creation() {
        let record = ProcessRecord::new("nginx", 1234, 57);

        assert_eq!(record.name, "nginx");
        assert_eq!(record.pid, 1234);
        assert_eq!(record.open_files, 57);
    }

    #[test]
    fn test_is_named_exact_match_only() {
        let record = ProcessRecord::new("postgres", 10, 0);

        assert!(record.is_named("postgres"));
        assert!(!record.is_named("Postgres"));
        assert!(!record.is_named("postgre"));
        assert!(!record.is_named("postgres "));
    }

    // ===== Thresholds Tests =====

    #[test]
    fn test_threshold_values() {
        let thresholds = Thresholds::new(1000, 0.9, 0.8);

        assert_eq!(thresholds.critical_value(), 900.0);
        assert_eq!(thresholds.warning_value(), 800.0);
    }

    #[test]
    fn test_threshold_values_fractional() {
        let thresholds = Thresholds::new(1024, 0.9, 0.8);

        assert!((thresholds.critical_value() - 921.6).abs() < 1e-9);
        assert!((thresholds.warning_value() - 819.2).abs() < 1e-9);
    }

    #[test]
    fn test_thresholds_consistency() {
        assert!(Thresholds::new(1024, 0.9, 0.8).is_consistent());
        assert!(Thresholds::new(1024, 0.5, 0.5).is_consistent());
        assert!(!Thresholds::new(1024, 0.7, 0.8).is_consistent());
        assert!(!Thresholds::new(1024, 1.5, 0.8).is_consistent());
        assert!(!Thresholds::new(1024, 0.9, -0.1).is_consistent());
    }

    // ===== Status Tests =====

    #[test]
    fn test_status_exit_codes() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Ok.to_string(), "OK");
        assert_eq!(Status::Warning.to_string(), "WARNING");
        assert_eq!(Status::Critical.to_string(), "CRITICAL");
        assert_eq!(Status::Unknown.to_string(), "UNKNOWN");
    }
}
