use anyhow::{Context, Result};
use clap::Parser;
use fdcheck::config::{Config, LogConfig};
use fdcheck_core::{
    check, FdCountMode, ProcessScanner, Report, RlimitSource, Status, VERSION,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// fdcheck - open file descriptor check
///
/// Compares every process's open file descriptors with the RLIMIT_NOFILE
/// soft limit and prints a single monitoring status line.
/// Exit codes: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN.
#[derive(Parser, Debug)]
#[command(name = "fdcheck")]
#[command(version = VERSION)]
#[command(about = "Open file descriptor check for monitoring systems", long_about = None)]
struct Cli {
    /// Critical threshold as a fraction of the limit [default: 0.9]
    #[arg(long, value_name = "RATIO")]
    critical: Option<f64>,

    /// Warning threshold as a fraction of the limit [default: 0.8]
    #[arg(long, value_name = "RATIO")]
    warning: Option<f64>,

    /// Name of the process to watch (all processes when empty)
    #[arg(long, value_name = "NAME")]
    process: Option<String>,

    /// Descriptors to count: all, or paths (only those backed by a filesystem path) [default: all]
    #[arg(long, value_name = "MODE")]
    count_mode: Option<FdCountMode>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());

    // Logging comes up even when the configuration is broken
    let log_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("fdcheck: logging disabled: {:#}", e);
            None
        }
    };

    match config.and_then(|config| run(&cli, config)) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            error!("{:#}", e);
            let report = Report::new(Status::Unknown, format!("{:#}\n", e));
            print!("{}", report);
            ExitCode::from(report.exit_code())
        }
    }
}

/// Run a single check with CLI flags layered over the configuration
fn run(cli: &Cli, config: Config) -> Result<Report> {
    let config = apply_cli(cli, config);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let settings = config.check_settings();
    info!(
        "fdcheck v{}: critical {}, warning {}, process {:?}, count mode {}",
        VERSION,
        settings.critical_ratio,
        settings.warning_ratio,
        settings.process_name,
        config.scan.count_mode
    );

    let scanner = ProcessScanner::with_count_mode(config.scan.count_mode);
    let report = check(&scanner, &RlimitSource::new(), &settings).context("Check aborted")?;

    info!("Result: {} (exit {})", report.status, report.exit_code());
    Ok(report)
}

/// Command line flags win over file values
fn apply_cli(cli: &Cli, mut config: Config) -> Config {
    if let Some(critical) = cli.critical {
        config.thresholds.critical = critical;
    }
    if let Some(warning) = cli.warning {
        config.thresholds.warning = warning;
    }
    if let Some(process) = &cli.process {
        config.thresholds.process = process.clone();
    }
    if let Some(count_mode) = cli.count_mode {
        config.scan.count_mode = count_mode;
    }

    config
}

/// Load configuration from file or use defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {:?}", path)),
        None => Ok(Config::default()),
    }
}

/// Initialize logging on stderr, plus a rolling file when configured
///
/// Stdout carries only the status line. The returned guard must live until
/// exit so buffered file output is flushed.
fn init_logging(logging: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let (file_layer, guard) = match &logging.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;

            let file_appender = tracing_appender::rolling::daily(dir, "fdcheck.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}
