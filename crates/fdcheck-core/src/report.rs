//! Status line formatting.
//!
//! Message texts are a compatibility contract with monitoring consumers,
//! including the "Proccess" spelling and the perfdata suffix.

use crate::types::{ProcessRecord, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final result of one check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub status: Status,
    pub message: String,
}

impl Report {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.status.exit_code()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.label(), self.message)
    }
}

/// Detailed line for a single process, with perfdata
pub fn detail_message(record: &ProcessRecord, max_open_files: u64) -> String {
    format!(
        "Proccess {name} with PID {pid} uses {count}/{max} open file descriptors. | {name}={count};;;;{max}\n",
        name = record.name,
        pid = record.pid,
        count = record.open_files,
        max = max_open_files,
    )
}

/// One line naming every offending process
pub fn summary_message(records: &[ProcessRecord]) -> String {
    let list = records
        .iter()
        .map(|r| format!("{}(PID: {})", r.name, r.pid))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Processes {} have too many open file descriptors.\n", list)
}

pub fn all_clear_message(max_open_files: u64) -> String {
    format!(
        "All processes' open file descriptors are below the maximum of {}.",
        max_open_files
    )
}

pub fn no_match_message(process_name: &str) -> String {
    format!("No process named {} is running.\n", process_name)
}
