use crate::{Error, Result};
use nix::sys::resource::{getrlimit, Resource};
use tracing::debug;

/// Source of the per-process open file descriptor ceiling
pub trait LimitSource {
    /// Soft limit on open descriptors per process.
    ///
    /// A failure here makes the whole check meaningless, callers treat it
    /// as fatal.
    fn max_open_files(&self) -> Result<u64>;
}

/// Reads RLIMIT_NOFILE of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct RlimitSource;

impl RlimitSource {
    pub fn new() -> Self {
        Self
    }
}

impl LimitSource for RlimitSource {
    fn max_open_files(&self) -> Result<u64> {
        let (soft, hard) = getrlimit(Resource::RLIMIT_NOFILE)
            .map_err(|e| Error::Limit(format!("getrlimit(RLIMIT_NOFILE) failed: {}", e)))?;

        debug!("RLIMIT_NOFILE: soft={}, hard={}", soft, hard);

        validate_soft_limit(soft as u64)
    }
}

/// A fixed ceiling, for callers that already know the limit
#[derive(Debug, Clone, Copy)]
pub struct FixedLimit(pub u64);

impl LimitSource for FixedLimit {
    fn max_open_files(&self) -> Result<u64> {
        validate_soft_limit(self.0)
    }
}

fn validate_soft_limit(soft: u64) -> Result<u64> {
    if soft == libc::RLIM_INFINITY as u64 {
        return Err(Error::Limit(
            "open file soft limit is unlimited, no ceiling to compare against".to_string(),
        ));
    }

    if soft == 0 {
        return Err(Error::Limit("open file soft limit is 0".to_string()));
    }

    Ok(soft)
}
