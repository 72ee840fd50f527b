//! The host session shared by every element of a page object.
//!
//! A [`Page`] wraps the automation driver together with the defaults its
//! elements inherit: wait timeout, timeout policy (`reraise`), cache policy
//! and poll interval. It also carries the page-level gestures (swipe, flick,
//! tap) and the area/offset resolution used by element gestures.
//!
//! Pages are cheap to clone. Clones share the driver and keep the same
//! identity, so elements bound to either clone keep their caches.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pomelo::by::{By, Locator};
//! use pomelo::driver::AutomationDriver;
//! use pomelo::page::Page;
//!
//! # async fn run(driver: Arc<dyn AutomationDriver>) -> pomelo::Result<()> {
//! let page = Page::new(driver).with_timeout(Duration::from_secs(5));
//! let mut login = page.element(Locator::new(By::AccessibilityId, "login")?);
//! login.click().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::by::Locator;
use crate::config::{PomeloConfig, DEFAULT_TIMEOUT};
use crate::driver::AutomationDriver;
use crate::element::Element;
use crate::elements::Elements;
use crate::error::Result;
use crate::geometry::{Border, Coordinate, Point, Rect, Region, Stroke};
use crate::wait::Wait;

/// A driver plus the defaults its elements inherit.
#[derive(Clone)]
pub struct Page {
    id: Uuid,
    driver: Arc<dyn AutomationDriver>,
    timeout: Duration,
    reraise: bool,
    cache: bool,
    poll_interval: Duration,
    remark: String,
}

impl Page {
    /// Creates a page with [`PomeloConfig::default`].
    pub fn new(driver: Arc<dyn AutomationDriver>) -> Self {
        let config = PomeloConfig::default();
        Self {
            id: Uuid::new_v4(),
            driver,
            timeout: config.timeout().unwrap_or(DEFAULT_TIMEOUT),
            reraise: config.reraise,
            cache: config.cache,
            poll_interval: config.poll_interval(),
            remark: "Page".to_string(),
        }
    }

    /// Creates a page from an explicit configuration.
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for a negative or
    /// non-finite timeout.
    pub fn with_config(driver: Arc<dyn AutomationDriver>, config: PomeloConfig) -> Result<Self> {
        let timeout = config.timeout()?;
        Ok(Self {
            timeout,
            reraise: config.reraise,
            cache: config.cache,
            poll_interval: config.poll_interval(),
            ..Self::new(driver)
        })
    }

    /// Sets the default wait timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets whether timed-out waits return an error.
    pub fn with_reraise(mut self, reraise: bool) -> Self {
        self.reraise = reraise;
        self
    }

    /// Sets the default cache policy of elements.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the delay between two polls of a wait.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Names the page in log output.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Identity used by elements to detect rebinding to another page.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The shared automation driver.
    pub fn driver(&self) -> &Arc<dyn AutomationDriver> {
        &self.driver
    }

    /// The default wait timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether timed-out waits return an error by default.
    pub fn reraise(&self) -> bool {
        self.reraise
    }

    /// The default cache policy of elements.
    pub fn cache(&self) -> bool {
        self.cache
    }

    /// The delay between two polls of a wait.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The page name used in log output.
    pub fn remark(&self) -> &str {
        &self.remark
    }

    /// The page defaults as a serializable config.
    pub fn config(&self) -> PomeloConfig {
        PomeloConfig {
            timeout_secs: self.timeout.as_secs_f64(),
            reraise: self.reraise,
            cache: self.cache,
            poll_interval_ms: self.poll_interval.as_millis() as u64,
        }
    }

    /// A wait using `timeout`, or the page timeout when `None`.
    pub fn wait(&self, timeout: Option<Duration>) -> Wait {
        Wait::new(timeout.unwrap_or(self.timeout)).with_poll_interval(self.poll_interval)
    }

    /// Whether a timeout should raise, given a per-call override.
    pub fn timeout_reraise(&self, reraise: Option<bool>) -> bool {
        reraise.unwrap_or(self.reraise)
    }

    /// A single-element resolver bound to this page.
    pub fn element(&self, locator: Locator) -> Element {
        Element::new(self, locator)
    }

    /// A collection resolver bound to this page.
    pub fn elements(&self, locator: Locator) -> Elements {
        Elements::new(self, locator)
    }

    // -----------------------------------------------------------------------
    // Window geometry
    // -----------------------------------------------------------------------

    /// The current window rect.
    pub async fn window_rect(&self) -> Result<Rect> {
        Ok(self.driver.window_rect().await?)
    }

    /// `(left, right, top, bottom)` of the window rect.
    pub async fn window_border(&self) -> Result<Border> {
        Ok(self.window_rect().await?.border())
    }

    /// The truncated center of the window rect.
    pub async fn window_center(&self) -> Result<Point> {
        Ok(self.window_rect().await?.center())
    }

    /// Resolves `area` to absolute pixels.
    ///
    /// The window rect is only fetched for relative areas.
    pub async fn resolve_area(&self, area: Coordinate) -> Result<Region> {
        let window = if area.is_relative() {
            self.window_rect().await?
        } else {
            Rect::new(0.0, 0.0, 0.0, 0.0)
        };
        let region = area.resolve_area(&window)?;
        debug!(%region, "area resolved");
        Ok(region)
    }

    /// Resolves `offset` against an absolute area.
    pub fn resolve_offset(&self, offset: Coordinate, area: &Region) -> Result<Stroke> {
        let stroke = offset.resolve_offset(area)?;
        debug!(%stroke, "offset resolved");
        Ok(stroke)
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// Swipes along `stroke` over `duration_ms` milliseconds.
    #[instrument(skip(self), level = "debug")]
    pub async fn swipe(&self, stroke: Stroke, duration_ms: u64) -> Result<()> {
        self.driver
            .swipe(stroke.start_x, stroke.start_y, stroke.end_x, stroke.end_y, duration_ms)
            .await?;
        Ok(())
    }

    /// Flicks along `stroke`.
    #[instrument(skip(self), level = "debug")]
    pub async fn flick(&self, stroke: Stroke) -> Result<()> {
        self.driver
            .flick(stroke.start_x, stroke.start_y, stroke.end_x, stroke.end_y)
            .await?;
        Ok(())
    }

    /// Swipes `times` times along `offset` within `area`.
    ///
    /// Relative offsets are fractions of the resolved area; relative areas
    /// are fractions of the window rect.
    #[instrument(skip(self), level = "debug")]
    pub async fn swipe_by(
        &self,
        offset: Coordinate,
        area: Coordinate,
        duration_ms: u64,
        times: u32,
    ) -> Result<()> {
        let area = self.resolve_area(area).await?;
        let stroke = self.resolve_offset(offset, &area)?;
        for _ in 0..times {
            self.swipe(stroke, duration_ms).await?;
        }
        Ok(())
    }

    /// Flicks `times` times along `offset` within `area`.
    #[instrument(skip(self), level = "debug")]
    pub async fn flick_by(&self, offset: Coordinate, area: Coordinate, times: u32) -> Result<()> {
        let area = self.resolve_area(area).await?;
        let stroke = self.resolve_offset(offset, &area)?;
        for _ in 0..times {
            self.flick(stroke).await?;
        }
        Ok(())
    }

    /// Taps with up to five fingers, holding for `duration_ms` if given.
    #[instrument(skip(self), level = "debug")]
    pub async fn tap(&self, points: &[Point], duration_ms: Option<u64>) -> Result<()> {
        self.driver.tap(points, duration_ms).await?;
        Ok(())
    }

    /// Taps the center of the window.
    pub async fn tap_window_center(&self, duration_ms: Option<u64>) -> Result<()> {
        let center = self.window_center().await?;
        self.tap(&[center], duration_ms).await
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("remark", &self.remark)
            .field("timeout", &self.timeout)
            .field("reraise", &self.reraise)
            .field("cache", &self.cache)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
