//! Persistent configuration for pomelo.
//!
//! Stores the page-level defaults in `~/.pomelo/config.json`: the wait
//! timeout, whether timeouts raise, whether elements cache their handles,
//! and the poll interval of the wait engine.
//!
//! # Example
//!
//! ```no_run
//! use pomelo::config::PomeloConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = PomeloConfig::load();
//! println!("default timeout: {}s", config.timeout_secs);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_DIRNAME: &str = ".pomelo";
const CONFIG_FILENAME: &str = "config.json";

/// Returns `~/.pomelo`, creating it if needed.
///
/// `None` when the home directory cannot be determined.
pub fn pomelo_dir() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(CONFIG_DIRNAME);
    std::fs::create_dir_all(&dir).ok();
    Some(dir)
}

/// Page-level defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PomeloConfig {
    /// Default wait timeout in seconds.
    pub timeout_secs: f64,
    /// Whether a timed-out wait returns an error instead of its sentinel.
    pub reraise: bool,
    /// Whether elements keep the handles they resolve.
    pub cache: bool,
    /// Delay between two polls of a wait, in milliseconds.
    pub poll_interval_ms: u64,
}

/// Wait timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for PomeloConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            reraise: true,
            cache: true,
            poll_interval_ms: 500,
        }
    }
}

impl PomeloConfig {
    /// Load config from `~/.pomelo/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        pomelo_dir()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.pomelo/config.json`.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let dir = pomelo_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(dir.join(CONFIG_FILENAME), json)?;
        Ok(())
    }

    /// The default timeout as a [`Duration`].
    pub fn timeout(&self) -> Result<Duration> {
        secs_to_duration(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Rejects a negative or non-finite timeout.
    pub fn validate(&self) -> Result<()> {
        self.timeout().map(|_| ())
    }
}

/// Converts seconds to a [`Duration`], rejecting negative and non-finite values.
pub fn secs_to_duration(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        Error::Config(format!(
            "The timeout must be a finite, non-negative number of seconds, got {}.",
            secs
        ))
    })
}
