//! # pomelo
//!
//! Page Object Model layer for WebDriver/Appium style automation drivers.
//!
//! Elements are declared once on a page object and resolved lazily. Each
//! resolution waits for the element to reach a state (present, visible,
//! clickable), caches the handle it found, and transparently relocates when a
//! cached handle goes stale. Mobile elements can be scrolled into view and
//! aligned inside a target area with a two-phase gesture.
//!
//! ## Modules
//!
//! - [`driver`] - The [`AutomationDriver`] trait a backend implements
//! - [`page`] - The host session: driver plus inherited defaults and gestures
//! - [`element`] - Single-element resolver with tiered caching
//! - [`elements`] - Collection resolver
//! - [`wait`] - Polling wait engine
//! - [`conditions`] - Predicates evaluated by waits
//! - [`gesture`] - Scroll-until-visible and alignment
//! - [`select`] - `<select>` dropdown wrapper
//! - [`by`] / [`geometry`] - Locators, rects, borders and coordinates
//! - [`config`] / [`logging`] - Persisted defaults and subscriber setup
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pomelo::{By, Locator, MoveOptions, Offset, Page};
//!
//! # async fn run(driver: Arc<dyn pomelo::AutomationDriver>) -> pomelo::Result<()> {
//! let page = Page::new(driver);
//!
//! let mut settings = page.element(Locator::new(By::AccessibilityId, "settings")?);
//! settings.swipe_by(MoveOptions::default().with_offset(Offset::UP)).await?;
//! settings.click().await?;
//!
//! let rows = page.elements(Locator::new(By::ClassName, "row")?);
//! println!("{} rows: {:?}", rows.quantity().await?, rows.texts().await?);
//! # Ok(())
//! # }
//! ```

pub mod by;
pub mod conditions;
pub mod config;
pub mod driver;
pub mod element;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod page;
pub mod select;
pub mod wait;

pub use by::{By, Locator};
pub use conditions::Resolved;
pub use config::PomeloConfig;
pub use driver::{AutomationDriver, DriverError, DriverErrorKind, ElementHandle};
pub use element::Element;
pub use elements::Elements;
pub use error::{Error, Result};
pub use geometry::{Area, Border, Coordinate, Offset, Point, Rect, Region, Stroke};
pub use gesture::{GestureReport, MoveOptions};
pub use page::Page;
pub use select::Select;
pub use wait::{IgnoredErrors, Wait};
