//! Logging setup for the buildcast binary.
//!
//! Console output always; an optional daily-rolling file when `--log-dir`
//! is given. The returned guard must live as long as the process logs.

use crate::constants::env;
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging flags shared by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct LoggingArgs {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = env::LOG_LEVEL, global = true)]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = env::LOG_FILTER, global = true)]
    pub log_filter: Option<String>,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,
}

impl LoggingArgs {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace",
            (1, _) => "debug",
            (0, Some(level)) => level,
            _ => "info",
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let level = self
            .get_effective_level()
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::INFO);

        EnvFilter::builder()
            .with_default_directive(level.into())
            .parse_lossy(self.log_filter.as_deref().unwrap_or(""))
    }
}

/// Install the global subscriber.
pub fn init_logging(args: &LoggingArgs) -> Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_timer(ChronoLocal::rfc_3339())
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    let (file, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "buildcast.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(ChronoLocal::rfc_3339())
                .with_ansi(false)
                .with_thread_ids(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(args.env_filter())
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    Ok(guard)
}
