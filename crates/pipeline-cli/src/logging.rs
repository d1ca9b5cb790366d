//! Terminal-aware logging setup, mirroring the rest of the workspace's
//! `tracing` + `tracing-subscriber` conventions.

use std::io::IsTerminal;

use clap::ValueEnum;
use eyre::{Context, Result};
use tracing::metadata::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// The minimum log level emitted by the pipeline crates themselves.
#[derive(Debug, Copy, Clone, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum LoggingLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LoggingLevel {
    fn as_str(self) -> &'static str {
        match self {
            LoggingLevel::Trace => "trace",
            LoggingLevel::Debug => "debug",
            LoggingLevel::Info => "info",
            LoggingLevel::Warn => "warn",
            LoggingLevel::Error => "error",
        }
    }
}

impl From<LoggingLevel> for LevelFilter {
    fn from(value: LoggingLevel) -> Self {
        match value {
            LoggingLevel::Trace => LevelFilter::TRACE,
            LoggingLevel::Debug => LevelFilter::DEBUG,
            LoggingLevel::Info => LevelFilter::INFO,
            LoggingLevel::Warn => LevelFilter::WARN,
            LoggingLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Which `tracing-subscriber` formatter to use.
#[derive(Debug, Copy, Clone, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum LoggingFormat {
    Auto,
    Compact,
    Pretty,
    Json,
}

/// Install the global `tracing` subscriber.
///
/// `level` sets the minimum level for this workspace's own crates; `filter`
/// is appended as an extra `EnvFilter` directive string so other crates
/// (`tokio`, etc.) can be tuned independently. `format` picks the
/// formatter; `auto` chooses `pretty` on a terminal and `json` otherwise.
pub fn setup(level: LoggingLevel, filter: &str, format: LoggingFormat) -> Result<()> {
    let is_term = std::io::stderr().is_terminal();
    let format = match format {
        LoggingFormat::Auto if is_term => LoggingFormat::Pretty,
        LoggingFormat::Auto => LoggingFormat::Json,
        other => other,
    };

    let directives = format!(
        "{}{}{}",
        level.as_str(),
        if filter.is_empty() { "" } else { "," },
        filter
    );
    let filter_layer = EnvFilter::builder()
        .parse(&directives)
        .wrap_err_with(|| format!("unable to parse logging filter: {directives}"))?;

    let registry = registry().with(filter_layer).with(ErrorLayer::default());
    let format_layer = fmt::layer().with_ansi(is_term).with_writer(std::io::stderr);

    match format {
        LoggingFormat::Compact => registry.with(format_layer.compact()).init(),
        LoggingFormat::Pretty => registry.with(format_layer.pretty()).init(),
        LoggingFormat::Json => registry.with(format_layer.json()).init(),
        LoggingFormat::Auto => unreachable!("resolved above"),
    }

    tracing::trace!("logging set up finished");
    Ok(())
}
