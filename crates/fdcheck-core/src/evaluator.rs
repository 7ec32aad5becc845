use crate::report::{
    all_clear_message, detail_message, no_match_message, summary_message, Report,
};
use crate::types::{ProcessRecord, Status, Thresholds};
use tracing::{debug, info};

/// Processes over a threshold, in input order
///
/// A process is in at most one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub criticals: Vec<ProcessRecord>,
    pub warnings: Vec<ProcessRecord>,
}

impl Classification {
    pub fn is_clear(&self) -> bool {
        self.criticals.is_empty() && self.warnings.is_empty()
    }
}

/// Turns a process sample into a single status line
///
/// Every method is pure: the same sample and thresholds always give the
/// same report.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    thresholds: Thresholds,
}

impl Evaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify one process against the thresholds
    ///
    /// Critical wins over warning, both comparisons are strict.
    pub fn classify(&self, record: &ProcessRecord) -> Status {
        let count = record.open_files as f64;

        if count > self.thresholds.critical_value() {
            Status::Critical
        } else if count > self.thresholds.warning_value() {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    /// Single pass over every process, bucketing the offenders
    pub fn sweep(&self, processes: &[ProcessRecord]) -> Classification {
        let mut classification = Classification::default();

        for record in processes {
            match self.classify(record) {
                Status::Critical => classification.criticals.push(record.clone()),
                Status::Warning => classification.warnings.push(record.clone()),
                _ => {}
            }
        }

        classification
    }

    /// Find the process named `name` holding the most descriptors
    ///
    /// Ties go to the lowest PID so the result does not depend on
    /// enumeration order.
    pub fn select_target<'a>(
        processes: &'a [ProcessRecord],
        name: &str,
    ) -> Option<&'a ProcessRecord> {
        processes
            .iter()
            .filter(|record| record.is_named(name))
            .min_by(|a, b| {
                b.open_files
                    .cmp(&a.open_files)
                    .then_with(|| a.pid.cmp(&b.pid))
            })
    }

    /// Evaluate the sample
    ///
    /// With a non-empty `target` only that process is reported, otherwise
    /// the whole table is swept.
    pub fn evaluate(&self, processes: &[ProcessRecord], target: Option<&str>) -> Report {
        match target.filter(|name| !name.is_empty()) {
            Some(name) => self.evaluate_target(processes, name),
            None => self.evaluate_all(processes),
        }
    }

    fn evaluate_target(&self, processes: &[ProcessRecord], name: &str) -> Report {
        let matches = processes.iter().filter(|r| r.is_named(name)).count();
        debug!("{} process(es) named {}", matches, name);

        let Some(record) = Self::select_target(processes, name) else {
            info!("No process named {} found", name);
            return Report::new(Status::Unknown, no_match_message(name));
        };

        let status = self.classify(record);
        info!(
            "Target {} (PID {}): {}/{} open files -> {}",
            record.name, record.pid, record.open_files, self.thresholds.max_open_files, status
        );

        Report::new(
            status,
            detail_message(record, self.thresholds.max_open_files),
        )
    }

    fn evaluate_all(&self, processes: &[ProcessRecord]) -> Report {
        let classification = self.sweep(processes);
        let max = self.thresholds.max_open_files;

        info!(
            "Swept {} processes: {} critical, {} warning",
            processes.len(),
            classification.criticals.len(),
            classification.warnings.len()
        );

        if !classification.criticals.is_empty() {
            Report::new(Status::Critical, Self::bucket_message(&classification.criticals, max))
        } else if !classification.warnings.is_empty() {
            Report::new(Status::Warning, Self::bucket_message(&classification.warnings, max))
        } else {
            Report::new(Status::Ok, all_clear_message(max))
        }
    }

    // Callers guarantee a non-empty bucket
    fn bucket_message(bucket: &[ProcessRecord], max_open_files: u64) -> String {
        match bucket {
            [single] => detail_message(single, max_open_files),
            many => summary_message(many),
        }
    }
}
