//! fdcheck Core Library
//!
//! Samples the process table, compares each process's open file descriptor
//! count with the RLIMIT_NOFILE soft limit and produces a monitoring-plugin
//! status line.

pub mod error;
pub mod evaluator;
pub mod limits;
pub mod report;
pub mod scanner;
pub mod types;

pub use error::{Error, Result};
pub use evaluator::{Classification, Evaluator};
pub use limits::{FixedLimit, LimitSource, RlimitSource};
pub use report::Report;
pub use scanner::{FdCountMode, ProcessScanner, ProcessSource};
pub use types::{ProcessRecord, Status, Thresholds};

use tracing::{info, warn};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_CRITICAL_RATIO: f64 = 0.9;
pub const DEFAULT_WARNING_RATIO: f64 = 0.8;

/// Per-run settings for [`check`]
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSettings {
    pub critical_ratio: f64,
    pub warning_ratio: f64,
    /// Only report this process; `None` or empty sweeps every process
    pub process_name: Option<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            critical_ratio: DEFAULT_CRITICAL_RATIO,
            warning_ratio: DEFAULT_WARNING_RATIO,
            process_name: None,
        }
    }
}

/// Run one check: read the ceiling, sample processes, evaluate
///
/// The ceiling is read first; if it is unavailable nothing else is
/// sampled and the error is returned.
pub fn check(
    source: &dyn ProcessSource,
    limits: &dyn LimitSource,
    settings: &CheckSettings,
) -> Result<Report> {
    let max_open_files = limits.max_open_files()?;
    let thresholds = Thresholds::new(max_open_files, settings.critical_ratio, settings.warning_ratio);

    if !thresholds.is_consistent() {
        warn!(
            "Inconsistent ratios (warning {}, critical {}), expected 0 <= warning <= critical <= 1",
            settings.warning_ratio, settings.critical_ratio
        );
    }

    info!(
        "Ceiling {} open files, critical above {:.1}, warning above {:.1}",
        max_open_files,
        thresholds.critical_value(),
        thresholds.warning_value()
    );

    let processes = source.processes()?;
    let evaluator = Evaluator::new(thresholds);

    Ok(evaluator.evaluate(&processes, settings.process_name.as_deref()))
}
