use crate::{types::ProcessRecord, Error, Result};
use procfs::process::{FDTarget, Process};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Longest name the kernel keeps in `comm` (TASK_COMM_LEN - 1)
const COMM_MAX_LEN: usize = 15;

/// Anything that can list the live process table
pub trait ProcessSource {
    /// Sample every live process once.
    ///
    /// Per-process failures must not fail the whole call; only an
    /// inaccessible process table is an error.
    fn processes(&self) -> Result<Vec<ProcessRecord>>;
}

/// Which descriptors count towards a process total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FdCountMode {
    /// Every entry of /proc/<pid>/fd
    #[default]
    All,
    /// Only descriptors that resolve to a filesystem path
    Paths,
}

impl FromStr for FdCountMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FdCountMode::All),
            "paths" => Ok(FdCountMode::Paths),
            other => Err(Error::Parse(format!(
                "unknown count mode '{}', expected 'all' or 'paths'",
                other
            ))),
        }
    }
}

impl fmt::Display for FdCountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdCountMode::All => f.write_str("all"),
            FdCountMode::Paths => f.write_str("paths"),
        }
    }
}

/// Process scanner backed by /proc
#[derive(Debug, Clone, Default)]
pub struct ProcessScanner {
    count_mode: FdCountMode,
}

impl ProcessScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count_mode(count_mode: FdCountMode) -> Self {
        Self { count_mode }
    }

    pub fn count_mode(&self) -> FdCountMode {
        self.count_mode
    }

    /// Build a record for one process, swallowing per-field failures
    fn sample(&self, process: &Process) -> ProcessRecord {
        let pid = process.pid();
        let name = self.process_name(process);
        let open_files = self.count_open_files(process);

        ProcessRecord::new(name, pid, open_files)
    }

    /// Process name, or an empty string when it cannot be read
    fn process_name(&self, process: &Process) -> String {
        let comm = match process.stat() {
            Ok(stat) => stat.comm,
            Err(e) => {
                debug!("PID {}: cannot read stat: {}", process.pid(), e);
                return String::new();
            }
        };

        if comm.len() < COMM_MAX_LEN {
            return comm;
        }

        // comm may be truncated, argv[0] often carries the full name
        match process.cmdline() {
            Ok(cmdline) => resolve_name(&comm, &cmdline),
            Err(e) => {
                debug!("PID {}: cannot read cmdline: {}", process.pid(), e);
                comm
            }
        }
    }

    /// Number of open descriptors, 0 when /proc/<pid>/fd is unreadable
    fn count_open_files(&self, process: &Process) -> u64 {
        let counted = match self.count_mode {
            FdCountMode::All => process.fd_count(),
            FdCountMode::Paths => process.fd().map(|fds| {
                fds.filter_map(|fd| fd.ok())
                    .filter(|fd| matches!(fd.target, FDTarget::Path(_)))
                    .count()
            }),
        };

        match counted {
            Ok(count) => count as u64,
            Err(e) => {
                debug!("PID {}: cannot list descriptors: {}", process.pid(), e);
                0
            }
        }
    }
}

impl ProcessSource for ProcessScanner {
    fn processes(&self) -> Result<Vec<ProcessRecord>> {
        let all = procfs::process::all_processes()
            .map_err(|e| Error::Scanner(format!("Failed to enumerate /proc: {}", e)))?;

        let mut records = Vec::new();

        for entry in all {
            match entry {
                Ok(process) => records.push(self.sample(&process)),
                // Process exited between readdir and open
                Err(e) => debug!("Skipping process: {}", e),
            }
        }

        records.sort_by_key(|record| record.pid);
        debug!(
            "Sampled {} processes (count mode: {})",
            records.len(),
            self.count_mode
        );

        Ok(records)
    }
}

/// Pick the untruncated process name when argv[0] extends `comm`
fn resolve_name(comm: &str, cmdline: &[String]) -> String {
    let extended = cmdline
        .first()
        .and_then(|argv0| Path::new(argv0).file_name())
        .and_then(|base| base.to_str())
        // Some programs rewrite argv[0] as "name: status"
        .map(|base| base.split_whitespace().next().unwrap_or(base))
        .map(|base| base.trim_end_matches(':'))
        .filter(|base| base.len() > comm.len() && base.starts_with(comm));

    match extended {
        Some(base) => base.to_string(),
        None => comm.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmdline(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_scanner_default_mode() {
        let scanner = ProcessScanner::new();
        assert_eq!(scanner.count_mode(), FdCountMode::All);
    }

    #[test]
    fn test_scanner_with_count_mode() {
        let scanner = ProcessScanner::with_count_mode(FdCountMode::Paths);
        assert_eq!(scanner.count_mode(), FdCountMode::Paths);
    }

    #[test]
    fn test_count_mode_from_str() {
        assert_eq!("all".parse::<FdCountMode>().unwrap(), FdCountMode::All);
        assert_eq!("PATHS".parse::<FdCountMode>().unwrap(), FdCountMode::Paths);

        let err = "sockets".parse::<FdCountMode>().unwrap_err();
        assert!(err.to_string().contains("sockets"));
    }

    #[test]
    fn test_count_mode_display_roundtrip() {
        for mode in [FdCountMode::All, FdCountMode::Paths] {
            assert_eq!(mode.to_string().parse::<FdCountMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_count_mode_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: FdCountMode,
        }

        let w: Wrapper = toml::from_str(r#"mode = "paths""#).unwrap();
        assert_eq!(w.mode, FdCountMode::Paths);
    }

    #[test]
    fn test_resolve_name_short_comm_kept() {
        // Not truncated, argv[0] is irrelevant
        assert_eq!(resolve_name("bash", &cmdline(&["/bin/bash"])), "bash");
    }

    #[test]
    fn test_resolve_name_extends_truncated_comm() {
        let name = resolve_name(
            "systemd-journal",
            &cmdline(&["/usr/lib/systemd/systemd-journald"]),
        );
        assert_eq!(name, "systemd-journald");
    }

    #[test]
    fn test_resolve_name_ignores_unrelated_argv0() {
        let name = resolve_name("kworker/u16:2-e", &cmdline(&["/usr/bin/python3"]));
        assert_eq!(name, "kworker/u16:2-e");
    }

    #[test]
    fn test_resolve_name_empty_cmdline() {
        // Kernel threads have no cmdline
        assert_eq!(resolve_name("ksoftirqd/0", &[]), "ksoftirqd/0");
    }

    #[test]
    fn test_resolve_name_rewritten_argv0() {
        let name = resolve_name(
            "my-long-daemon-",
            &cmdline(&["my-long-daemon-name: worker 3"]),
        );
        assert_eq!(name, "my-long-daemon-name");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_sample_self() {
        let scanner = ProcessScanner::new();
        let me = Process::myself().unwrap();
        let record = scanner.sample(&me);

        assert_eq!(record.pid, std::process::id() as i32);
        assert!(!record.name.is_empty());
        // stdin/stdout/stderr at minimum
        assert!(record.open_files >= 3);
    }
}
