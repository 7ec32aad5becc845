//! fdcheck
//!
//! Monitoring check for open file descriptors per process.

pub mod config;

pub use config::Config;
