use fdcheck_core::{
    CheckSettings, Error, FdCountMode, Result, DEFAULT_CRITICAL_RATIO, DEFAULT_WARNING_RATIO,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Optional configuration file for fdcheck
///
/// Every section and key may be omitted; command line flags take
/// precedence over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threshold ratios and target process
    pub thresholds: ThresholdConfig,

    /// Process table sampling
    pub scan: ScanConfig,

    /// Logging configuration
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fraction of the ceiling above which a process is critical (default: 0.9)
    pub critical: f64,

    /// Fraction of the ceiling above which a process is in warning (default: 0.8)
    pub warning: f64,

    /// Only check processes with exactly this name (default: empty, all processes)
    pub process: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Which descriptors are counted (default: all)
    pub count_mode: FdCountMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset (default: warn)
    pub level: String,

    /// Directory for a daily rolling log file (default: none, stderr only)
    pub log_dir: Option<PathBuf>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical: DEFAULT_CRITICAL_RATIO,
            warning: DEFAULT_WARNING_RATIO,
            process: String::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use fdcheck::config::Config;
    ///
    /// let config = Config::load_from_file("/etc/fdcheck/config.toml").unwrap();
    /// println!("Critical ratio: {}", config.thresholds.critical);
    /// ```
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Validate configuration values
    ///
    /// Ratios only need to be usable numbers. Their relative order is not
    /// enforced.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("Critical", self.thresholds.critical),
            ("Warning", self.thresholds.warning),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "{} ratio must be a finite number >= 0, got: {}",
                    name, value
                ));
            }
        }

        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(format!("Invalid log level: {}", self.logging.level));
        }

        Ok(())
    }

    /// Settings for a single check run
    pub fn check_settings(&self) -> CheckSettings {
        let process = self.thresholds.process.trim();

        CheckSettings {
            critical_ratio: self.thresholds.critical,
            warning_ratio: self.thresholds.warning,
            process_name: (!process.is_empty()).then(|| process.to_string()),
        }
    }
}
