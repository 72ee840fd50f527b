//! Polling wait engine.
//!
//! [`Wait::until`] evaluates an async predicate until it yields a value or
//! the deadline passes. Driver errors whose kind is in the wait's
//! [`IgnoredErrors`] set count as "not yet"; any other error ends the wait
//! immediately. Every `wait_*` operation of the resolvers is built on it.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pomelo::wait::Wait;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut polls = 0;
//! let value = Wait::new(Duration::from_secs(1))
//!     .with_poll_interval(Duration::from_millis(1))
//!     .until(|| {
//!         polls += 1;
//!         let ready = polls >= 3;
//!         async move { Ok(ready.then_some("ready")) }
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(value, "ready");
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::driver::{DriverError, DriverErrorKind};
use crate::error::{Error, Result};

/// Default delay between two predicate evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The set of driver error kinds a wait treats as "not yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredErrors(Vec<DriverErrorKind>);

impl IgnoredErrors {
    /// Ignores nothing.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Adds `kind` to the set.
    pub fn with(mut self, kind: DriverErrorKind) -> Self {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
        self
    }

    /// `NoSuchElement` plus `StaleElement`, used while relocating an element.
    pub fn relocating() -> Self {
        Self::default().with(DriverErrorKind::StaleElement)
    }

    pub fn contains(&self, kind: DriverErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn ignores(&self, error: &DriverError) -> bool {
        self.contains(error.kind())
    }
}

impl Default for IgnoredErrors {
    /// `NoSuchElement` only.
    fn default() -> Self {
        Self(vec![DriverErrorKind::NoSuchElement])
    }
}

/// A configured polling loop.
#[derive(Debug, Clone)]
pub struct Wait {
    timeout: Duration,
    poll_interval: Duration,
    ignored: IgnoredErrors,
}

impl Wait {
    /// Creates a wait with the default poll interval and ignored set.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ignored: IgnoredErrors::default(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Replaces the ignored set.
    pub fn with_ignored(mut self, ignored: IgnoredErrors) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn ignored(&self) -> &IgnoredErrors {
        &self.ignored
    }

    /// Polls `predicate` until it returns `Ok(Some(_))`.
    ///
    /// The predicate always runs at least once, even with a zero timeout.
    /// Returns [`Error::Timeout`] when the deadline passes, or
    /// [`Error::Driver`] for the first error outside the ignored set.
    pub async fn until<T, F, Fut>(&self, mut predicate: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, DriverError>>,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match predicate().await {
                Ok(Some(value)) => {
                    trace!(attempts, "wait condition met");
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) if self.ignored.ignores(&e) => {
                    trace!(error = %e, attempts, "ignored error while waiting");
                }
                Err(e) => return Err(Error::Driver(e)),
            }

            if start.elapsed() >= self.timeout {
                debug!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    attempts, "wait timed out"
                );
                return Err(Error::Timeout {
                    timeout: self.timeout,
                    message: format!("Timed out after {} seconds", format_secs(self.timeout)),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// Formats a duration as seconds without a trailing `.0`, e.g. `3` or `0.5`.
pub(crate) fn format_secs(duration: Duration) -> String {
    format!("{}", duration.as_secs_f64())
}
