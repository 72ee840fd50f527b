//! Automation driver trait for backend-agnostic UI automation.
//!
//! This module defines the [`AutomationDriver`] trait, the only boundary
//! between this crate and a live browser or device. A backend (a WebDriver
//! HTTP client, an Appium session, or an in-memory fake for tests) implements
//! the trait once, and every resolver and gesture in the crate works with it.
//!
//! Elements are referred to by [`ElementHandle`]s: opaque ids issued by the
//! backend. A handle is a revocable capability. When the UI node behind it
//! goes away, the next call using the handle fails with
//! [`DriverError::StaleElement`]; there is no proactive notification.
//!
//! [`HandleRead`] turns that failure into data so callers can branch on it
//! with a plain `match`:
//!
//! ```
//! use pomelo::driver::{DriverError, HandleRead};
//!
//! let read = HandleRead::from_result(Err::<bool, _>(DriverError::StaleElement("gone".into())));
//! assert!(matches!(read, Ok(HandleRead::Stale)));
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::by::By;
use crate::geometry::{Point, Rect};

/// Errors reported by an [`AutomationDriver`] backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// No element matched the locator (or the index was out of range).
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// The handle no longer refers to a live UI node.
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// The element exists but cannot receive the interaction.
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// The backend does not implement this operation (e.g. flick on a desktop browser).
    #[error("Unsupported by this driver: {0}")]
    Unsupported(String),

    /// A command or operation failed with the given message.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The backend is not available or not connected.
    #[error("Not connected to automation backend")]
    NotConnected,

    /// The backend's own command timeout fired.
    #[error("Driver command timed out")]
    Timeout,
}

/// Discriminant of [`DriverError`], used to configure which errors a wait ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverErrorKind {
    NoSuchElement,
    StaleElement,
    NotInteractable,
    Unsupported,
    CommandFailed,
    NotConnected,
    Timeout,
}

impl DriverError {
    pub fn kind(&self) -> DriverErrorKind {
        match self {
            DriverError::NoSuchElement(_) => DriverErrorKind::NoSuchElement,
            DriverError::StaleElement(_) => DriverErrorKind::StaleElement,
            DriverError::NotInteractable(_) => DriverErrorKind::NotInteractable,
            DriverError::Unsupported(_) => DriverErrorKind::Unsupported,
            DriverError::CommandFailed(_) => DriverErrorKind::CommandFailed,
            DriverError::NotConnected => DriverErrorKind::NotConnected,
            DriverError::Timeout => DriverErrorKind::Timeout,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, DriverError::StaleElement(_))
    }

    pub fn is_no_such_element(&self) -> bool {
        matches!(self, DriverError::NoSuchElement(_))
    }
}

/// Opaque reference to a live UI node, issued by the driver.
///
/// Cloning a handle does not touch the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The backend-specific element id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The outcome of reading through a handle that may have gone stale.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleRead<T> {
    /// The handle was live and produced a value.
    Fresh(T),
    /// The handle no longer refers to a live node; relocate and retry.
    Stale,
}

impl<T> HandleRead<T> {
    /// Splits a driver result into fresh/stale, passing every other error through.
    pub fn from_result(result: Result<T, DriverError>) -> Result<Self, DriverError> {
        match result {
            Ok(value) => Ok(HandleRead::Fresh(value)),
            Err(e) if e.is_stale() => Ok(HandleRead::Stale),
            Err(e) => Err(e),
        }
    }

    pub fn fresh(self) -> Option<T> {
        match self {
            HandleRead::Fresh(value) => Some(value),
            HandleRead::Stale => None,
        }
    }
}

/// Trait for backend-agnostic browser and mobile UI automation.
///
/// Implementors provide element lookup, handle reads and input injection.
/// Gesture methods ([`swipe`](AutomationDriver::swipe),
/// [`flick`](AutomationDriver::flick), [`tap`](AutomationDriver::tap)) are
/// mobile-only and default to [`DriverError::Unsupported`].
///
/// # Required Methods
///
/// Implementors must provide: [`find_elements`](AutomationDriver::find_elements),
/// [`find_child_elements`](AutomationDriver::find_child_elements),
/// [`is_displayed`](AutomationDriver::is_displayed),
/// [`is_enabled`](AutomationDriver::is_enabled),
/// [`is_selected`](AutomationDriver::is_selected),
/// [`rect`](AutomationDriver::rect), [`text`](AutomationDriver::text),
/// [`tag_name`](AutomationDriver::tag_name),
/// [`attribute`](AutomationDriver::attribute),
/// [`click`](AutomationDriver::click), [`clear`](AutomationDriver::clear),
/// [`send_keys`](AutomationDriver::send_keys) and
/// [`window_rect`](AutomationDriver::window_rect).
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Find every element matching the strategy and value.
    ///
    /// Returns an empty list, never an error, when nothing matches.
    async fn find_elements(&self, by: By, value: &str) -> Result<Vec<ElementHandle>, DriverError>;

    /// Find elements matching the strategy and value below `parent`.
    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        by: By,
        value: &str,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    /// The element frame in device pixels.
    async fn rect(&self, element: &ElementHandle) -> Result<Rect, DriverError>;

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    async fn tag_name(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// An attribute (or, for WebDriver, the property fallback) of the element.
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// A DOM property of the element.
    ///
    /// The default implementation delegates to [`attribute`](Self::attribute).
    async fn property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.attribute(element, name).await
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// The current window (viewport) rect.
    async fn window_rect(&self) -> Result<Rect, DriverError>;

    /// Swipe from one point to another over `duration_ms` milliseconds.
    async fn swipe(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        duration_ms: u64,
    ) -> Result<(), DriverError> {
        let _ = (start_x, start_y, end_x, end_y, duration_ms);
        Err(DriverError::Unsupported("swipe".to_string()))
    }

    /// Flick from one point to another. Flicks have no duration.
    async fn flick(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Result<(), DriverError> {
        let _ = (start_x, start_y, end_x, end_y);
        Err(DriverError::Unsupported("flick".to_string()))
    }

    /// Tap with up to five fingers at the given points.
    async fn tap(&self, points: &[Point], duration_ms: Option<u64>) -> Result<(), DriverError> {
        let _ = (points, duration_ms);
        Err(DriverError::Unsupported("tap".to_string()))
    }
}
