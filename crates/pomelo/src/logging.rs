//! Subscriber setup for applications embedding the library.
//!
//! The library itself only emits `tracing` events. Test suites and scripts
//! that want to see them call [`init`] once at startup.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::pomelo_dir;
use crate::error::{Error, Result};

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log directory. `None` writes to stderr.
    pub dir: Option<PathBuf>,
    /// File name of the daily-rolled log.
    pub file_name: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            dir: None,
            file_name: "pomelo.log".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Logs to `~/.pomelo/logs/pomelo.log`.
    pub fn to_default_dir() -> Self {
        Self {
            dir: logs_dir(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// `~/.pomelo/logs`, created on demand.
pub fn logs_dir() -> Option<PathBuf> {
    let dir = pomelo_dir()?.join("logs");
    std::fs::create_dir_all(&dir).ok();
    Some(dir)
}

/// Installs the global subscriber.
///
/// When logging to a file, the returned guard flushes the non-blocking writer
/// on drop and must be kept alive for the lifetime of the program. Fails with
/// [`Error::Config`] if a global subscriber is already installed.
pub fn init(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter());

    let installed = match &config.dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, &config.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let builder = builder.with_writer(non_blocking).with_ansi(false);
            let result = if config.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            result.map(|()| Some(guard))
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            let result = if config.json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            result.map(|()| None)
        }
    };
    installed.map_err(|e| Error::Config(format!("failed to install subscriber: {}", e)))
}
