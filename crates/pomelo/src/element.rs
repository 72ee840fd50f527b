//! Single-element resolution with handle caching.
//!
//! An [`Element`] is a [`Locator`] bound to a [`Page`]. It turns the locator
//! into a live [`ElementHandle`] at one of three readiness tiers:
//!
//! | Tier | Condition |
//! |------|-----------|
//! | [`Tier::Present`] | the locator matches |
//! | [`Tier::Visible`] | present and displayed |
//! | [`Tier::Clickable`] | visible and enabled |
//!
//! # Caching
//!
//! When caching is enabled, a successfully resolved handle is kept in the
//! slot of its tier and in every slot below it. Later waits first poll the
//! cached present handle only, without running the locator again. If the
//! driver reports that handle stale, the wait falls back to relocating the
//! element on every poll. Reads and interactions follow the same rule: use
//! the cached handle of the needed tier, relocate on stale.
//!
//! Caches are cleared when the element is bound to a different page or
//! re-targeted with [`Element::dynamic`].
//!
//! # Timeouts
//!
//! Every `wait_*` method takes an optional timeout (element, then page
//! default) and an optional `reraise` flag (page default). On timeout it
//! either returns [`Error::Timeout`] or its sentinel (`None` / `false`).

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info_span, Instrument};

use crate::by::{By, Locator};
use crate::conditions::{self, Resolved};
use crate::driver::{AutomationDriver, DriverError, ElementHandle, HandleRead};
use crate::error::{Error, Result};
use crate::gesture::{self, GestureReport, MoveOptions, Movement};
use crate::geometry::{Border, Point, Rect};
use crate::page::Page;
use crate::select::Select;
use crate::wait::{format_secs, IgnoredErrors, Wait};

/// Readiness tiers, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Present,
    Visible,
    Clickable,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Present => f.write_str("present"),
            Tier::Visible => f.write_str("visible"),
            Tier::Clickable => f.write_str("clickable"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CacheSlots {
    present: Option<ElementHandle>,
    visible: Option<ElementHandle>,
    clickable: Option<ElementHandle>,
    select: Option<Select>,
}

impl CacheSlots {
    /// Stores `handle` at `tier` and every tier below it.
    fn fill(&mut self, tier: Tier, handle: &ElementHandle) {
        self.present = Some(handle.clone());
        if tier >= Tier::Visible {
            self.visible = Some(handle.clone());
        }
        if tier >= Tier::Clickable {
            self.clickable = Some(handle.clone());
        }
    }

    fn get(&self, tier: Tier) -> Option<&ElementHandle> {
        match tier {
            Tier::Present => self.present.as_ref(),
            Tier::Visible => self.visible.as_ref(),
            Tier::Clickable => self.clickable.as_ref(),
        }
    }
}

/// A locator bound to a page, with per-tier handle caches.
#[derive(Debug, Clone)]
pub struct Element {
    page: Page,
    locator: Locator,
    timeout: Option<Duration>,
    cache: Option<bool>,
    remark: Option<String>,
    slots: CacheSlots,
}

impl Element {
    /// Binds `locator` to `page` with empty caches and inherited defaults.
    pub fn new(page: &Page, locator: Locator) -> Self {
        Self {
            page: page.clone(),
            locator,
            timeout: None,
            cache: None,
            remark: None,
            slots: CacheSlots::default(),
        }
    }

    /// Overrides the page timeout for this element.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the page cache policy for this element.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Names the element in timeout messages.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// The page this element is bound to.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The locator this element resolves.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The locator strategy.
    pub fn by(&self) -> By {
        self.locator.by()
    }

    /// The locator value.
    pub fn value(&self) -> &str {
        self.locator.value()
    }

    /// The position among matches, if the locator targets one.
    pub fn index(&self) -> Option<usize> {
        self.locator.index()
    }

    /// The element timeout, or the page timeout if unset.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or_else(|| self.page.timeout())
    }

    /// Sets the element timeout; `None` falls back to the page timeout.
    pub fn reset_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Whether caching is in effect, resolved against the page policy.
    pub fn cache(&self) -> bool {
        self.cache.unwrap_or_else(|| self.page.cache())
    }

    /// Keeps resolved handles regardless of the page policy.
    pub fn enable_cache(&mut self) {
        self.cache = Some(true);
    }

    /// Resolves through the locator on every call.
    pub fn disable_cache(&mut self) {
        self.cache = Some(false);
    }

    /// Goes back to inheriting the page cache policy.
    pub fn unset_cache(&mut self) {
        self.cache = None;
    }

    /// The custom remark, or `by=value[index]`.
    pub fn remark(&self) -> String {
        self.remark.clone().unwrap_or_else(|| self.locator.describe())
    }

    /// Sets the remark; `None` falls back to the locator description.
    pub fn reset_remark(&mut self, remark: Option<String>) {
        self.remark = remark;
    }

    /// Binds the element to `page`.
    ///
    /// Caches are cleared when `page` is a different page than the current
    /// one; rebinding to a clone of the same page keeps them.
    pub fn bind(&mut self, page: &Page) -> &mut Self {
        if page.id() != self.page.id() {
            debug!(remark = %self.remark(), "bound to a new page, clearing caches");
            self.clear_caches();
        }
        self.page = page.clone();
        self
    }

    /// Re-targets the element and clears every cache.
    pub fn dynamic(&mut self, locator: Locator) -> &mut Self {
        self.locator = locator;
        self.clear_caches();
        self
    }

    fn clear_caches(&mut self) {
        self.slots = CacheSlots::default();
    }

    fn wait(&self, timeout: Option<Duration>) -> Wait {
        self.page.wait(Some(timeout.unwrap_or_else(|| self.timeout())))
    }

    fn driver(&self) -> Arc<dyn AutomationDriver> {
        Arc::clone(self.page.driver())
    }

    // -----------------------------------------------------------------------
    // Caches
    // -----------------------------------------------------------------------

    /// The cached present handle.
    pub fn present_cache(&self) -> Option<&ElementHandle> {
        self.slots.present.as_ref()
    }

    /// The cached visible handle.
    pub fn visible_cache(&self) -> Option<&ElementHandle> {
        self.slots.visible.as_ref()
    }

    /// The cached clickable handle.
    pub fn clickable_cache(&self) -> Option<&ElementHandle> {
        self.slots.clickable.as_ref()
    }

    /// The cached [`Select`] wrapper.
    pub fn select_cache(&self) -> Option<&Select> {
        self.slots.select.as_ref()
    }

    /// The cached handle for `tier`, if caching is enabled.
    fn cached(&self, tier: Tier) -> Option<ElementHandle> {
        if self.cache() {
            self.slots.get(tier).cloned()
        } else {
            None
        }
    }

    fn store(&mut self, tier: Tier, handle: &ElementHandle) {
        if self.cache() {
            self.slots.fill(tier, handle);
        }
    }

    // -----------------------------------------------------------------------
    // Timeout handling
    // -----------------------------------------------------------------------

    /// Rewords a raw wait timeout with this element's remark and status.
    fn describe_timeout(&self, error: Error, status: &str, present: bool) -> Error {
        match error {
            Error::Timeout { timeout, .. } => {
                let status = if present {
                    status.to_string()
                } else {
                    format!("{} or absent", status)
                };
                Error::Timeout {
                    timeout,
                    message: format!(
                        "Timed out waiting {} seconds for element \"{}\" to be \"{}\".",
                        format_secs(timeout),
                        self.remark(),
                        status
                    ),
                }
            }
            other => other,
        }
    }

    /// Applies the reraise policy to a worded wait result.
    fn or_sentinel<T>(&self, result: Result<T>, reraise: Option<bool>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_timeout() && !self.page.timeout_reraise(reraise) => {
                debug!(remark = %self.remark(), error = %e, "wait timed out");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Runs the locator without waiting.
    pub async fn find_element(&self) -> Result<ElementHandle> {
        Ok(conditions::find_element_by(self.driver().as_ref(), &self.locator).await?)
    }

    async fn locate_present(&mut self, timeout: Option<Duration>) -> Result<ElementHandle> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;

        if let Some(handle) = self.cached(Tier::Present) {
            match HandleRead::from_result(driver.is_displayed(&handle).await)? {
                HandleRead::Fresh(_) => return Ok(handle),
                HandleRead::Stale => {
                    debug!(remark = %self.remark(), "present cache is stale, relocating")
                }
            }
        }
        let handle = self
            .wait(timeout)
            .until(move || conditions::presence_of_element_located(driver, locator))
            .await?;
        self.store(Tier::Present, &handle);
        Ok(handle)
    }

    async fn locate_visible(&mut self, timeout: Option<Duration>) -> Result<ElementHandle> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let handle = cached_or_located(
            &self.wait(timeout),
            cached.as_ref().map(|h| move || conditions::visibility_of_element(driver, h)),
            move || conditions::visibility_of_element_located(driver, locator),
        )
        .await?;
        self.store(Tier::Visible, &handle);
        Ok(handle)
    }

    async fn locate_clickable(&mut self, timeout: Option<Duration>) -> Result<ElementHandle> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let handle = cached_or_located(
            &self.wait(timeout),
            cached.as_ref().map(|h| move || conditions::element_to_be_clickable(driver, h)),
            move || conditions::element_located_to_be_clickable(driver, locator),
        )
        .await?;
        self.store(Tier::Clickable, &handle);
        Ok(handle)
    }

    /// Waits for the element to be present.
    ///
    /// A cached present handle is verified with a single handle read instead
    /// of a lookup.
    pub async fn wait_present(
        &mut self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let result = self.locate_present(timeout).await;
        let result = result.map_err(|e| self.describe_timeout(e, "present", true));
        self.or_sentinel(result, reraise)
    }

    /// Waits until the locator matches nothing. `false` on timeout without reraise.
    pub async fn wait_absent(&mut self, timeout: Option<Duration>, reraise: Option<bool>) -> Result<bool> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;

        let result = self
            .wait(timeout)
            .until(move || conditions::absence_of_element_located(driver, locator))
            .await
            .map_err(|e| self.describe_timeout(e, "absent", true));
        Ok(self.or_sentinel(result, reraise)?.is_some())
    }

    /// Waits for the element to be present and displayed.
    pub async fn wait_visible(
        &mut self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let result = self.locate_visible(timeout).await;
        let result = result.map_err(|e| self.describe_timeout(e, "visible", true));
        self.or_sentinel(result, reraise)
    }

    /// Waits for the element to be invisible.
    ///
    /// With `present == false` an absent or stale element also satisfies the
    /// wait and yields [`Resolved::Absent`].
    pub async fn wait_invisible(
        &mut self,
        timeout: Option<Duration>,
        present: bool,
        reraise: Option<bool>,
    ) -> Result<Option<Resolved>> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let result = cached_or_located_tagged(
            &self.wait(timeout),
            cached
                .as_ref()
                .map(|h| move || conditions::invisibility_of_element(driver, h, present)),
            move || conditions::invisibility_of_element_located(driver, locator, present),
        )
        .await;
        self.finish_negated(result, "invisible", present, reraise)
    }

    /// Waits for the element to be displayed and enabled.
    pub async fn wait_clickable(
        &mut self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let result = self.locate_clickable(timeout).await;
        let result = result.map_err(|e| self.describe_timeout(e, "clickable", true));
        self.or_sentinel(result, reraise)
    }

    /// Waits for the element to be displayed-and-enabled no longer.
    ///
    /// `present` behaves as in [`wait_invisible`](Self::wait_invisible).
    pub async fn wait_unclickable(
        &mut self,
        timeout: Option<Duration>,
        present: bool,
        reraise: Option<bool>,
    ) -> Result<Option<Resolved>> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let result = cached_or_located_tagged(
            &self.wait(timeout),
            cached
                .as_ref()
                .map(|h| move || conditions::element_to_be_unclickable(driver, h, present)),
            move || conditions::element_located_to_be_unclickable(driver, locator, present),
        )
        .await;
        self.finish_negated(result, "unclickable", present, reraise)
    }

    /// Waits for the element to be selected.
    pub async fn wait_selected(
        &mut self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let result = cached_or_located_tagged(
            &self.wait(timeout),
            cached.as_ref().map(|h| move || conditions::element_to_be_selected(driver, h)),
            move || conditions::element_located_to_be_selected(driver, locator),
        )
        .await;
        self.finish_checked(result, "selected", reraise)
    }

    /// Waits for the element to be present and not selected.
    pub async fn wait_unselected(
        &mut self,
        timeout: Option<Duration>,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        let driver = self.driver();
        let driver = driver.as_ref();
        let locator = &self.locator;
        let cached = self.cached(Tier::Present);

        let result = cached_or_located_tagged(
            &self.wait(timeout),
            cached.as_ref().map(|h| move || conditions::element_to_be_unselected(driver, h)),
            move || conditions::element_located_to_be_unselected(driver, locator),
        )
        .await;
        self.finish_checked(result, "unselected", reraise)
    }

    /// Caches a relocated negated result at the present tier.
    fn finish_negated(
        &mut self,
        result: Result<(Resolved, Source)>,
        status: &str,
        present: bool,
        reraise: Option<bool>,
    ) -> Result<Option<Resolved>> {
        if let Ok((Resolved::Handle(handle), Source::Located)) = &result {
            self.store(Tier::Present, handle);
        }
        let result = result
            .map(|(resolved, _)| resolved)
            .map_err(|e| self.describe_timeout(e, status, present));
        self.or_sentinel(result, reraise)
    }

    /// Caches a relocated selected/unselected handle at the present tier.
    fn finish_checked(
        &mut self,
        result: Result<(ElementHandle, Source)>,
        status: &str,
        reraise: Option<bool>,
    ) -> Result<Option<ElementHandle>> {
        if let Ok((handle, Source::Located)) = &result {
            self.store(Tier::Present, handle);
        }
        let result = result
            .map(|(handle, _)| handle)
            .map_err(|e| self.describe_timeout(e, status, true));
        self.or_sentinel(result, reraise)
    }

    /// `wait_present` that always raises on timeout.
    pub async fn present(&mut self) -> Result<ElementHandle> {
        let result = self.locate_present(None).await;
        result.map_err(|e| self.describe_timeout(e, "present", true))
    }

    /// `wait_visible` that always raises on timeout.
    pub async fn visible(&mut self) -> Result<ElementHandle> {
        let result = self.locate_visible(None).await;
        result.map_err(|e| self.describe_timeout(e, "visible", true))
    }

    /// `wait_clickable` that always raises on timeout.
    pub async fn clickable(&mut self) -> Result<ElementHandle> {
        let result = self.locate_clickable(None).await;
        result.map_err(|e| self.describe_timeout(e, "clickable", true))
    }

    async fn require(&mut self, tier: Tier) -> Result<ElementHandle> {
        match tier {
            Tier::Present => self.present().await,
            Tier::Visible => self.visible().await,
            Tier::Clickable => self.clickable().await,
        }
    }

    /// Reads through the cached handle of `tier`, relocating once if it is stale.
    async fn read<T, F, Fut>(&mut self, tier: Tier, read: F) -> Result<T>
    where
        F: Fn(Arc<dyn AutomationDriver>, ElementHandle) -> Fut,
        Fut: Future<Output = std::result::Result<T, DriverError>>,
    {
        if let Some(handle) = self.cached(tier) {
            match HandleRead::from_result(read(self.driver(), handle).await)? {
                HandleRead::Fresh(value) => return Ok(value),
                HandleRead::Stale => {
                    debug!(remark = %self.remark(), %tier, "cached handle is stale, relocating")
                }
            }
        }
        let handle = self.require(tier).await?;
        Ok(read(self.driver(), handle).await?)
    }

    // -----------------------------------------------------------------------
    // State queries
    // -----------------------------------------------------------------------

    /// Whether the element is present within `timeout`.
    pub async fn is_present(&mut self, timeout: Option<Duration>) -> Result<bool> {
        Ok(self.wait_present(timeout, Some(false)).await?.is_some())
    }

    /// Whether the element is displayed. Caches it as visible if so.
    pub async fn is_visible(&mut self) -> Result<bool> {
        let (handle, displayed) = self
            .read(Tier::Present, |driver, handle| async move {
                let displayed = driver.is_displayed(&handle).await?;
                Ok::<_, DriverError>((handle, displayed))
            })
            .await?;
        if displayed {
            self.store(Tier::Visible, &handle);
        }
        Ok(displayed)
    }

    /// Whether the present element is enabled.
    pub async fn is_enabled(&mut self) -> Result<bool> {
        self.read(Tier::Present, |driver, handle| async move {
            driver.is_enabled(&handle).await
        })
        .await
    }

    /// Whether the element is displayed and enabled. Caches it as clickable if so.
    pub async fn is_clickable(&mut self) -> Result<bool> {
        let (handle, clickable) = self
            .read(Tier::Present, |driver, handle| async move {
                let clickable =
                    driver.is_displayed(&handle).await? && driver.is_enabled(&handle).await?;
                Ok::<_, DriverError>((handle, clickable))
            })
            .await?;
        if clickable {
            self.store(Tier::Clickable, &handle);
        }
        Ok(clickable)
    }

    /// Whether the present element is selected.
    pub async fn is_selected(&mut self) -> Result<bool> {
        self.read(Tier::Present, |driver, handle| async move {
            driver.is_selected(&handle).await
        })
        .await
    }

    /// Whether the element is present within `timeout` and displayed.
    ///
    /// Used by the gesture search; never raises on timeout.
    pub async fn is_viewable(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let Some(handle) = self.wait_present(timeout, Some(false)).await? else {
            return Ok(false);
        };
        let displayed = HandleRead::from_result(self.driver().is_displayed(&handle).await)?;
        let viewable = displayed == HandleRead::Fresh(true);
        if viewable {
            self.store(Tier::Visible, &handle);
        }
        Ok(viewable)
    }

    // -----------------------------------------------------------------------
    // Handle reads
    // -----------------------------------------------------------------------

    /// The text of the present element.
    pub async fn text(&mut self) -> Result<String> {
        self.read(Tier::Present, |driver, handle| async move { driver.text(&handle).await })
            .await
    }

    /// The text of the visible element.
    pub async fn visible_text(&mut self) -> Result<String> {
        self.read(Tier::Visible, |driver, handle| async move { driver.text(&handle).await })
            .await
    }

    /// The tag name of the present element.
    pub async fn tag_name(&mut self) -> Result<String> {
        self.read(Tier::Present, |driver, handle| async move {
            driver.tag_name(&handle).await
        })
        .await
    }

    /// The rect of the present element.
    pub async fn rect(&mut self) -> Result<Rect> {
        self.read(Tier::Present, |driver, handle| async move { driver.rect(&handle).await })
            .await
    }

    /// `(left, right, top, bottom)` of the element rect.
    pub async fn border(&mut self) -> Result<Border> {
        Ok(self.rect().await?.border())
    }

    /// The truncated center of the element rect.
    pub async fn center(&mut self) -> Result<Point> {
        Ok(self.rect().await?.center())
    }

    /// An attribute of the present element; `None` if unset.
    pub async fn attribute(&mut self, name: &str) -> Result<Option<String>> {
        self.read(Tier::Present, |driver, handle| async move {
            driver.attribute(&handle, name).await
        })
        .await
    }

    /// A property of the present element; `None` if unset.
    pub async fn property(&mut self, name: &str) -> Result<Option<String>> {
        self.read(Tier::Present, |driver, handle| async move {
            driver.property(&handle, name).await
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Interactions
    // -----------------------------------------------------------------------

    /// Clicks the clickable element.
    pub async fn click(&mut self) -> Result<()> {
        self.read(Tier::Clickable, |driver, handle| async move { driver.click(&handle).await })
            .await
    }

    /// Clears the text of the clickable element.
    pub async fn clear(&mut self) -> Result<()> {
        self.read(Tier::Clickable, |driver, handle| async move { driver.clear(&handle).await })
            .await
    }

    /// Types `text` into the clickable element.
    pub async fn send_keys(&mut self, text: &str) -> Result<()> {
        self.read(Tier::Clickable, |driver, handle| async move {
            driver.send_keys(&handle, text).await
        })
        .await
    }

    /// Taps the center of the present element.
    pub async fn tap(&mut self, duration_ms: Option<u64>) -> Result<()> {
        let center = self.center().await?;
        self.page.tap(&[center], duration_ms).await
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// Swipes until the element is viewable, then aligns it inside the area.
    pub async fn swipe_by(&mut self, options: MoveOptions) -> Result<GestureReport> {
        let movement = Movement::Swipe { duration_ms: options.duration_ms };
        let span = info_span!("swipe_by", remark = %self.remark());
        self.move_by(options, movement).instrument(span).await
    }

    /// Flicks until the element is viewable, then aligns it with swipes.
    pub async fn flick_by(&mut self, options: MoveOptions) -> Result<GestureReport> {
        let span = info_span!("flick_by", remark = %self.remark());
        self.move_by(options, Movement::Flick).instrument(span).await
    }

    async fn move_by(&mut self, options: MoveOptions, movement: Movement) -> Result<GestureReport> {
        let page = self.page.clone();
        let area = page.resolve_area(options.area).await?;
        let stroke = page.resolve_offset(options.offset, &area)?;

        let search_rounds =
            gesture::coarse_search(self, stroke, movement, options.timeout, options.max_rounds)
                .await?;
        let align_rounds = gesture::fine_align(
            self,
            area,
            options.max_align_rounds,
            options.min_distance,
            options.duration_ms,
        )
        .await?;
        Ok(GestureReport { search_rounds, align_rounds })
    }

    // -----------------------------------------------------------------------
    // Select
    // -----------------------------------------------------------------------

    /// The [`Select`] wrapper for the present element.
    pub async fn select(&mut self) -> Result<Select> {
        let mut select = None;
        if let Some(handle) = self.cached(Tier::Present) {
            match Select::new(self.driver(), handle).await {
                Err(e) if e.is_stale() => {
                    debug!(remark = %self.remark(), "present cache is stale, relocating")
                }
                other => select = Some(other?),
            }
        }
        let select = match select {
            Some(select) => select,
            None => {
                let handle = self.present().await?;
                Select::new(self.driver(), handle).await?
            }
        };
        if self.cache() {
            self.slots.select = Some(select.clone());
        }
        Ok(select)
    }

    /// Runs `op` on the cached select, rebuilding it once if stale.
    async fn with_select<T, F, Fut>(&mut self, op: F) -> Result<T>
    where
        F: Fn(Select) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cached = if self.cache() { self.slots.select.clone() } else { None };
        if let Some(select) = cached {
            match op(select).await {
                Err(e) if e.is_stale() => {
                    debug!(remark = %self.remark(), "select cache is stale, relocating")
                }
                other => return other,
            }
        }
        let select = self.select().await?;
        op(select).await
    }

    /// Every `<option>` of the select.
    pub async fn options(&mut self) -> Result<Vec<ElementHandle>> {
        self.with_select(|select| async move { select.options().await }).await
    }

    /// The selected options.
    pub async fn all_selected_options(&mut self) -> Result<Vec<ElementHandle>> {
        self.with_select(|select| async move { select.all_selected_options().await })
            .await
    }

    /// The first selected option.
    pub async fn first_selected_option(&mut self) -> Result<ElementHandle> {
        self.with_select(|select| async move { select.first_selected_option().await })
            .await
    }

    /// Selects options whose `value` attribute equals `value`.
    pub async fn select_by_value(&mut self, value: &str) -> Result<()> {
        self.with_select(|select| async move { select.select_by_value(value).await })
            .await
    }

    /// Selects options whose `index` attribute equals `index`.
    pub async fn select_by_index(&mut self, index: usize) -> Result<()> {
        self.with_select(|select| async move { select.select_by_index(index).await })
            .await
    }

    /// Selects options whose trimmed text equals `text`.
    pub async fn select_by_visible_text(&mut self, text: &str) -> Result<()> {
        self.with_select(|select| async move { select.select_by_visible_text(text).await })
            .await
    }

    /// Clears every selected option of a multiple select.
    pub async fn deselect_all(&mut self) -> Result<()> {
        self.with_select(|select| async move { select.deselect_all().await })
            .await
    }

    /// Deselects options whose `value` attribute equals `value`.
    pub async fn deselect_by_value(&mut self, value: &str) -> Result<()> {
        self.with_select(|select| async move { select.deselect_by_value(value).await })
            .await
    }

    /// Deselects options whose `index` attribute equals `index`.
    pub async fn deselect_by_index(&mut self, index: usize) -> Result<()> {
        self.with_select(|select| async move { select.deselect_by_index(index).await })
            .await
    }

    /// Deselects options whose trimmed text equals `text`.
    pub async fn deselect_by_visible_text(&mut self, text: &str) -> Result<()> {
        self.with_select(|select| async move { select.deselect_by_visible_text(text).await })
            .await
    }
}

/// Which phase of a wait produced its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Cached,
    Located,
}

type Check<T> = std::result::Result<Option<T>, DriverError>;

/// Polls `cached` with the default ignored set, then `located` with stale
/// handles ignored if the cached handle went stale (or there was none).
async fn cached_or_located_tagged<T, C, CF, L, LF>(
    wait: &Wait,
    cached: Option<C>,
    located: L,
) -> Result<(T, Source)>
where
    C: FnMut() -> CF,
    CF: Future<Output = Check<T>>,
    L: FnMut() -> LF,
    LF: Future<Output = Check<T>>,
{
    if let Some(cached) = cached {
        match wait.until(cached).await {
            Err(e) if e.is_stale() => debug!("cached handle is stale, relocating"),
            other => return other.map(|value| (value, Source::Cached)),
        }
    }
    let value = wait
        .clone()
        .with_ignored(IgnoredErrors::relocating())
        .until(located)
        .await?;
    Ok((value, Source::Located))
}

async fn cached_or_located<T, C, CF, L, LF>(wait: &Wait, cached: Option<C>, located: L) -> Result<T>
where
    C: FnMut() -> CF,
    CF: Future<Output = Check<T>>,
    L: FnMut() -> LF,
    LF: Future<Output = Check<T>>,
{
    cached_or_located_tagged(wait, cached, located)
        .await
        .map(|(value, _)| value)
}
