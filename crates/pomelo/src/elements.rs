//! Multi-element resolution.
//!
//! [`Elements`] resolves a locator to the whole result set. Unlike
//! [`Element`](crate::element::Element) it keeps no caches: every call runs
//! the locator again. The locator's index, if any, is ignored.

use std::time::Duration;

use tracing::debug;

use crate::by::Locator;
use crate::conditions;
use crate::driver::{AutomationDriver, ElementHandle};
use crate::error::{Error, Result};
use crate::geometry::{Border, Point, Rect};
use crate::page::Page;
use crate::wait::{format_secs, IgnoredErrors, Wait};

/// A locator bound to a page, resolved to every match.
#[derive(Debug, Clone)]
pub struct Elements {
    page: Page,
    locator: Locator,
    timeout: Option<Duration>,
    remark: Option<String>,
}

impl Elements {
    /// Binds `locator` to `page` with inherited defaults.
    pub fn new(page: &Page, locator: Locator) -> Self {
        Self {
            page: page.clone(),
            locator,
            timeout: None,
            remark: None,
        }
    }

    /// Overrides the page timeout for this collection.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Names the collection in timeout messages.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// The page this collection is bound to.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The locator every call runs.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The collection timeout, or the page timeout if unset.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or_else(|| self.page.timeout())
    }

    /// Sets the timeout; `None` falls back to the page timeout.
    pub fn reset_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// The custom remark, or the locator description.
    pub fn remark(&self) -> String {
        self.remark.clone().unwrap_or_else(|| self.locator.describe())
    }

    /// Sets the remark; `None` falls back to the locator description.
    pub fn reset_remark(&mut self, remark: Option<String>) {
        self.remark = remark;
    }

    /// Binds the collection to `page`.
    pub fn bind(&mut self, page: &Page) -> &mut Self {
        self.page = page.clone();
        self
    }

    /// Re-targets the collection.
    pub fn dynamic(&mut self, locator: Locator) -> &mut Self {
        self.locator = locator;
        self
    }

    fn driver(&self) -> &dyn AutomationDriver {
        self.page.driver().as_ref()
    }

    fn wait(&self, timeout: Option<Duration>) -> Wait {
        self.page.wait(Some(timeout.unwrap_or_else(|| self.timeout())))
    }

    /// Rewords a raw wait timeout with this collection's remark and `status`.
    fn describe_timeout<T>(&self, result: Result<T>, status: &str) -> Result<T> {
        result.map_err(|e| match e {
            Error::Timeout { timeout, .. } => Error::Timeout {
                timeout,
                message: format!(
                    "Timed out waiting {} seconds for elements \"{}\" to be \"{}\".",
                    format_secs(timeout),
                    self.remark(),
                    status
                ),
            },
            other => other,
        })
    }

    fn or_sentinel<T>(&self, result: Result<T>, status: &str, reraise: Option<bool>) -> Result<Option<T>> {
        match self.describe_timeout(result, status) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Timeout { message, .. }) if !self.page.timeout_reraise(reraise) => {
                debug!(remark = %self.remark(), %message, "wait timed out");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Runs the locator once without waiting.
    pub async fn find_elements(&self) -> Result<Vec<ElementHandle>> {
        Ok(self
            .driver()
            .find_elements(self.locator.by(), self.locator.value())
            .await?)
    }

    /// Waits for at least one match and returns them all.
    pub async fn find(&self, timeout: Option<Duration>, reraise: Option<bool>) -> Result<Option<Vec<ElementHandle>>> {
        self.wait_all_present(timeout, reraise).await
    }

    /// Waits for at least one match and returns the one at `index`.
    ///
    /// An index past the end of the matches is [`Error::IndexOutOfRange`],
    /// not a timeout.
    pub async fn find_nth(
        &self,
        index: usize,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let Some(handles) = self.wait_all_present(timeout, reraise).await? else {
            return Ok(None);
        };
        let len = handles.len();
        handles
            .into_iter()
            .nth(index)
            .map(Some)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    // -----------------------------------------------------------------------
    // Waits
    // -----------------------------------------------------------------------

    async fn poll_all_present(&self, timeout: Option<Duration>) -> Result<Vec<ElementHandle>> {
        let (driver, locator) = (self.driver(), &self.locator);
        self.wait(timeout)
            .until(move || conditions::presence_of_all_elements_located(driver, locator))
            .await
    }

    async fn poll_all_visible(&self, timeout: Option<Duration>) -> Result<Vec<ElementHandle>> {
        let (driver, locator) = (self.driver(), &self.locator);
        self.wait(timeout)
            .with_ignored(IgnoredErrors::relocating())
            .until(move || conditions::visibility_of_all_elements_located(driver, locator))
            .await
    }

    async fn poll_any_visible(&self, timeout: Option<Duration>) -> Result<Vec<ElementHandle>> {
        let (driver, locator) = (self.driver(), &self.locator);
        self.wait(timeout)
            .with_ignored(IgnoredErrors::relocating())
            .until(move || conditions::visibility_of_any_elements_located(driver, locator))
            .await
    }

    /// Waits for at least one match. `None` on timeout without reraise.
    pub async fn wait_all_present(
        &self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<Vec<ElementHandle>>> {
        let result = self.poll_all_present(timeout).await;
        self.or_sentinel(result, "all present", reraise)
    }

    /// `false` on timeout without reraise.
    pub async fn wait_all_absent(&self, timeout: Option<Duration>, reraise: Option<bool>) -> Result<bool> {
        let (driver, locator) = (self.driver(), &self.locator);
        let result = self
            .wait(timeout)
            .until(move || conditions::absence_of_all_elements_located(driver, locator))
            .await;
        Ok(self.or_sentinel(result, "all absent", reraise)?.is_some())
    }

    /// Waits until there is at least one match and every match is displayed.
    pub async fn wait_all_visible(
        &self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<Vec<ElementHandle>>> {
        let result = self.poll_all_visible(timeout).await;
        self.or_sentinel(result, "all visible", reraise)
    }

    /// Waits until at least one match is displayed; returns the displayed ones.
    pub async fn wait_any_visible(
        &self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<Vec<ElementHandle>>> {
        let result = self.poll_any_visible(timeout).await;
        self.or_sentinel(result, "any visible", reraise)
    }

    /// `wait_all_present` that always raises on timeout.
    pub async fn all_present(&self) -> Result<Vec<ElementHandle>> {
        let result = self.poll_all_present(None).await;
        self.describe_timeout(result, "all present")
    }

    /// `wait_all_visible` that always raises on timeout.
    pub async fn all_visible(&self) -> Result<Vec<ElementHandle>> {
        let result = self.poll_all_visible(None).await;
        self.describe_timeout(result, "all visible")
    }

    /// `wait_any_visible` that always raises on timeout.
    pub async fn any_visible(&self) -> Result<Vec<ElementHandle>> {
        let result = self.poll_any_visible(None).await;
        self.describe_timeout(result, "any visible")
    }

    // -----------------------------------------------------------------------
    // State queries
    // -----------------------------------------------------------------------

    /// Whether at least one match appears within `timeout`.
    pub async fn are_all_present(&self, timeout: Option<Duration>) -> Result<bool> {
        Ok(self.wait_all_present(timeout, Some(false)).await?.is_some())
    }

    /// Whether every present match is displayed.
    pub async fn are_all_visible(&self) -> Result<bool> {
        for handle in self.all_present().await? {
            if !self.driver().is_displayed(&handle).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether at least one present match is displayed.
    pub async fn are_any_visible(&self) -> Result<bool> {
        for handle in self.all_present().await? {
            if self.driver().is_displayed(&handle).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The number of present matches; `0` when none appear before the timeout.
    pub async fn quantity(&self) -> Result<usize> {
        Ok(self
            .wait_all_present(None, Some(false))
            .await?
            .map_or(0, |handles| handles.len()))
    }

    // -----------------------------------------------------------------------
    // Aggregate reads
    // -----------------------------------------------------------------------

    async fn texts_of(&self, handles: Vec<ElementHandle>) -> Result<Vec<String>> {
        let mut texts = Vec::with_capacity(handles.len());
        for handle in &handles {
            texts.push(self.driver().text(handle).await?);
        }
        Ok(texts)
    }

    /// The texts of all present matches.
    pub async fn texts(&self) -> Result<Vec<String>> {
        let handles = self.all_present().await?;
        self.texts_of(handles).await
    }

    /// The texts of all matches, once every match is visible.
    pub async fn all_visible_texts(&self) -> Result<Vec<String>> {
        let handles = self.all_visible().await?;
        self.texts_of(handles).await
    }

    /// The texts of the visible matches.
    pub async fn any_visible_texts(&self) -> Result<Vec<String>> {
        let handles = self.any_visible().await?;
        self.texts_of(handles).await
    }

    /// The rects of all present matches.
    pub async fn rects(&self) -> Result<Vec<Rect>> {
        let mut rects = Vec::new();
        for handle in self.all_present().await? {
            rects.push(self.driver().rect(&handle).await?);
        }
        Ok(rects)
    }

    /// The borders of all present matches.
    pub async fn borders(&self) -> Result<Vec<Border>> {
        Ok(self.rects().await?.iter().map(Rect::border).collect())
    }

    /// The centers of all present matches.
    pub async fn centers(&self) -> Result<Vec<Point>> {
        Ok(self.rects().await?.iter().map(Rect::center).collect())
    }

    /// An attribute of every present match.
    pub async fn attributes(&self, name: &str) -> Result<Vec<Option<String>>> {
        let mut values = Vec::new();
        for handle in self.all_present().await? {
            values.push(self.driver().attribute(&handle, name).await?);
        }
        Ok(values)
    }

    /// A property of every present match.
    pub async fn properties(&self, name: &str) -> Result<Vec<Option<String>>> {
        let mut values = Vec::new();
        for handle in self.all_present().await? {
            values.push(self.driver().property(&handle, name).await?);
        }
        Ok(values)
    }
}
