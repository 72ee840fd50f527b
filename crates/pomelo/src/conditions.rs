//! Predicates evaluated by the wait engine.
//!
//! Each function performs one round of driver queries and answers
//! `Ok(Some(value))` when the condition holds or `Ok(None)` when it does not
//! hold yet. Driver errors are returned as-is so that [`Wait`](crate::wait::Wait)
//! can decide whether they are ignorable.
//!
//! Two families exist:
//!
//! - `*_located` functions run the locator on every call.
//! - The others probe an already resolved [`ElementHandle`] and never look the
//!   element up again. A stale handle surfaces as
//!   [`DriverError::StaleElement`], which the resolvers treat as the signal to
//!   fall back to the located variant.

use crate::by::Locator;
use crate::driver::{AutomationDriver, DriverError, ElementHandle};

type Check<T> = Result<Option<T>, DriverError>;

/// The outcome of a negated wait (invisible, unclickable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The element is present and in the awaited state.
    Handle(ElementHandle),
    /// The element is absent or stale, accepted because `present` was `false`.
    Absent,
}

impl Resolved {
    pub fn handle(&self) -> Option<&ElementHandle> {
        match self {
            Resolved::Handle(handle) => Some(handle),
            Resolved::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }
}

/// `find_element()` or `find_elements()[index]`.
///
/// An empty result or an index past the end is [`DriverError::NoSuchElement`].
pub async fn find_element_by(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Result<ElementHandle, DriverError> {
    let handles = driver.find_elements(locator.by(), locator.value()).await?;
    handles
        .into_iter()
        .nth(locator.index().unwrap_or(0))
        .ok_or_else(|| DriverError::NoSuchElement(locator.describe()))
}

/// `find_elements()`, with an empty result reported as [`DriverError::NoSuchElement`].
pub async fn find_elements_by(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Result<Vec<ElementHandle>, DriverError> {
    let handles = driver.find_elements(locator.by(), locator.value()).await?;
    if handles.is_empty() {
        return Err(DriverError::NoSuchElement(locator.describe()));
    }
    Ok(handles)
}

async fn is_clickable(driver: &dyn AutomationDriver, handle: &ElementHandle) -> Result<bool, DriverError> {
    Ok(driver.is_displayed(handle).await? && driver.is_enabled(handle).await?)
}

/// Folds a stale or missing element into [`Resolved::Absent`] when absence is allowed.
fn absent_unless_present(result: Check<Resolved>, present: bool) -> Check<Resolved> {
    match result {
        Err(e) if !present && (e.is_stale() || e.is_no_such_element()) => Ok(Some(Resolved::Absent)),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Single element, located on every poll
// ---------------------------------------------------------------------------

pub async fn presence_of_element_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<ElementHandle> {
    find_element_by(driver, locator).await.map(Some)
}

pub async fn absence_of_element_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<()> {
    match find_element_by(driver, locator).await {
        Ok(_) => Ok(None),
        Err(e) if e.is_no_such_element() => Ok(Some(())),
        Err(e) => Err(e),
    }
}

pub async fn visibility_of_element_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<ElementHandle> {
    let handle = find_element_by(driver, locator).await?;
    visibility_of_element(driver, &handle).await
}

/// Invisible, or (with `present == false`) absent or stale.
pub async fn invisibility_of_element_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
    present: bool,
) -> Check<Resolved> {
    let result = async {
        let handle = find_element_by(driver, locator).await?;
        let displayed = driver.is_displayed(&handle).await?;
        Ok::<_, DriverError>((!displayed).then_some(Resolved::Handle(handle)))
    }
    .await;
    absent_unless_present(result, present)
}

pub async fn element_located_to_be_clickable(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<ElementHandle> {
    let handle = find_element_by(driver, locator).await?;
    element_to_be_clickable(driver, &handle).await
}

/// Unclickable, or (with `present == false`) absent or stale.
pub async fn element_located_to_be_unclickable(
    driver: &dyn AutomationDriver,
    locator: &Locator,
    present: bool,
) -> Check<Resolved> {
    let result = async {
        let handle = find_element_by(driver, locator).await?;
        let clickable = is_clickable(driver, &handle).await?;
        Ok::<_, DriverError>((!clickable).then_some(Resolved::Handle(handle)))
    }
    .await;
    absent_unless_present(result, present)
}

pub async fn element_located_to_be_selected(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<ElementHandle> {
    let handle = find_element_by(driver, locator).await?;
    element_to_be_selected(driver, &handle).await
}

pub async fn element_located_to_be_unselected(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<ElementHandle> {
    let handle = find_element_by(driver, locator).await?;
    element_to_be_unselected(driver, &handle).await
}

// ---------------------------------------------------------------------------
// Single element, probed through a resolved handle
// ---------------------------------------------------------------------------

pub async fn visibility_of_element(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
) -> Check<ElementHandle> {
    Ok(driver.is_displayed(handle).await?.then(|| handle.clone()))
}

/// Invisible, or (with `present == false`) stale.
pub async fn invisibility_of_element(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
    present: bool,
) -> Check<Resolved> {
    let result = driver
        .is_displayed(handle)
        .await
        .map(|displayed| (!displayed).then(|| Resolved::Handle(handle.clone())));
    absent_unless_present(result, present)
}

pub async fn element_to_be_clickable(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
) -> Check<ElementHandle> {
    Ok(is_clickable(driver, handle).await?.then(|| handle.clone()))
}

/// Unclickable, or (with `present == false`) stale.
pub async fn element_to_be_unclickable(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
    present: bool,
) -> Check<Resolved> {
    let result = is_clickable(driver, handle)
        .await
        .map(|clickable| (!clickable).then(|| Resolved::Handle(handle.clone())));
    absent_unless_present(result, present)
}

pub async fn element_to_be_selected(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
) -> Check<ElementHandle> {
    Ok(driver.is_selected(handle).await?.then(|| handle.clone()))
}

pub async fn element_to_be_unselected(
    driver: &dyn AutomationDriver,
    handle: &ElementHandle,
) -> Check<ElementHandle> {
    Ok((!driver.is_selected(handle).await?).then(|| handle.clone()))
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// At least one match. An empty list means "not yet".
pub async fn presence_of_all_elements_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<Vec<ElementHandle>> {
    let handles = driver.find_elements(locator.by(), locator.value()).await?;
    Ok((!handles.is_empty()).then_some(handles))
}

pub async fn absence_of_all_elements_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<()> {
    let handles = driver.find_elements(locator.by(), locator.value()).await?;
    Ok(handles.is_empty().then_some(()))
}

/// Every match displayed. No match at all is [`DriverError::NoSuchElement`].
pub async fn visibility_of_all_elements_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<Vec<ElementHandle>> {
    let handles = find_elements_by(driver, locator).await?;
    for handle in &handles {
        if !driver.is_displayed(handle).await? {
            return Ok(None);
        }
    }
    Ok(Some(handles))
}

/// The displayed subset of the matches, when non-empty.
pub async fn visibility_of_any_elements_located(
    driver: &dyn AutomationDriver,
    locator: &Locator,
) -> Check<Vec<ElementHandle>> {
    let mut visible = Vec::new();
    for handle in find_elements_by(driver, locator).await? {
        if driver.is_displayed(&handle).await? {
            visible.push(handle);
        }
    }
    Ok((!visible.is_empty()).then_some(visible))
}
