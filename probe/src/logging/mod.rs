//! Tracing setup for the probe binary
//!
//! Output goes to stderr by default so rendered snapshots on stdout stay
//! clean. With `--trace-log` it goes to a file in the temp directory, created
//! only when the first event is written.

mod lazy_file_writer;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use error_stack::Report;
use lazy_file_writer::LazyFileWriter;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::constants::TRACE_LOG_FILE_NAME;
use crate::error::{Error, Result};

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(TracingLevel::Warn.as_u8());

/// Level filter that can be changed after the subscriber is installed
#[derive(Debug, Clone, Copy)]
pub struct DynamicFilter;

impl<S> Layer<S> for DynamicFilter
where
    S: Subscriber,
{
    fn enabled(
        &self,
        metadata: &tracing::Metadata<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        // HTTP client internals are noise next to provider probes
        let target = metadata.target();
        if target.starts_with("reqwest::")
            || target.starts_with("hyper")
            || target.starts_with("h2::")
            || target.starts_with("rustls::")
            || target.starts_with("want::")
        {
            return false;
        }

        TracingLevel::from(*metadata.level()).as_u8() <= CURRENT_LEVEL.load(Ordering::Relaxed)
    }
}

/// Tracing levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational events
    Info,
    /// Per-channel outcomes
    Debug,
    /// Every announcement, including rejected ones
    Trace,
}

impl FromStr for TracingLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid tracing level '{s}'. Valid levels are: error, warn, info, debug, trace"
            )),
        }
    }
}

impl From<Level> for TracingLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            Level::TRACE => Self::Trace,
        }
    }
}

impl TracingLevel {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }

    /// Lowercase level name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Level currently let through by [`DynamicFilter`]
    pub fn current() -> Self {
        match CURRENT_LEVEL.load(Ordering::Relaxed) {
            0 => Self::Error,
            2 => Self::Info,
            3 => Self::Debug,
            4 => Self::Trace,
            _ => Self::Warn,
        }
    }

    /// Change the level let through by [`DynamicFilter`]
    pub fn set(self) {
        CURRENT_LEVEL.store(self.as_u8(), Ordering::Relaxed);
    }
}

/// Path of the trace log file
pub fn trace_log_path() -> PathBuf {
    std::env::temp_dir().join(TRACE_LOG_FILE_NAME)
}

/// Install a stderr subscriber filtered at `level`
///
/// # Errors
/// Returns a log operation error when a global subscriber is already set.
pub fn init_stderr_tracing(level: TracingLevel) -> Result<()> {
    level.set();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    Registry::default()
        .with(DynamicFilter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Report::new(Error::log_setup_failed("stderr", e)))
}

/// Install a file subscriber filtered at `level`, returning the log path
///
/// The file is only created when the first event passes the filter.
///
/// # Errors
/// Returns a log operation error when a global subscriber is already set.
pub fn init_file_tracing(level: TracingLevel) -> Result<PathBuf> {
    level.set();
    let log_path = trace_log_path();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(LazyFileWriter::new(log_path.clone()))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    Registry::default()
        .with(DynamicFilter)
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            Report::new(Error::log_setup_failed("file", e))
                .attach(format!("trace log: {}", log_path.display()))
        })?;

    Ok(log_path)
}
