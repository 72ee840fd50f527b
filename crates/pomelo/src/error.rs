//! Crate-level error type.

use std::time::Duration;

use thiserror::Error;

use crate::driver::DriverError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A wait deadline elapsed without its condition holding.
    ///
    /// Only raised when the caller (or the page default) asked for `reraise`.
    #[error("{message}")]
    Timeout {
        /// The wait timeout that elapsed.
        timeout: Duration,
        /// Human-readable description including the locator remark.
        message: String,
    },

    /// A driver failure that is not part of normal polling.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A bad locator, coordinate, or timeout value. Never retried.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A positional lookup past the end of a collection.
    #[error("Index {index} is out of range for {len} element(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The element is not a `<select>`, or the option cannot be chosen.
    #[error("{0}")]
    Select(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Whether this wraps a stale-handle driver error.
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::Driver(e) if e.is_stale())
    }
}
