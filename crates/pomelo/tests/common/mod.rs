//! Shared test helpers for pomelo integration tests.
//!
//! [`MockDriver`] is an in-memory [`AutomationDriver`] whose element tree,
//! element state and staleness are scripted by the test. It counts lookups
//! and records every gesture so tests can assert on driver traffic.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use pomelo::by::{By, Locator};
use pomelo::driver::{AutomationDriver, DriverError, ElementHandle};
use pomelo::geometry::{Point, Rect};
use pomelo::page::Page;

// ---------------------------------------------------------------------------
// Recorded traffic
// ---------------------------------------------------------------------------

/// A gesture as received by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Swipe {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        duration_ms: u64,
    },
    Flick {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    },
    Tap {
        points: Vec<Point>,
        duration_ms: Option<u64>,
    },
}

impl Gesture {
    pub fn swipe(start_x: i32, start_y: i32, end_x: i32, end_y: i32, duration_ms: u64) -> Self {
        Gesture::Swipe { start_x, start_y, end_x, end_y, duration_ms }
    }

    pub fn flick(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Gesture::Flick { start_x, start_y, end_x, end_y }
    }
}

// ---------------------------------------------------------------------------
// Scriptable driver
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MockState {
    locators: HashMap<(By, String), Vec<ElementHandle>>,
    children: HashMap<(String, By, String), Vec<ElementHandle>>,
    displayed: HashMap<String, bool>,
    enabled: HashMap<String, bool>,
    selected: HashSet<String>,
    stale: HashSet<String>,
    rects: HashMap<String, Rect>,
    texts: HashMap<String, String>,
    tags: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    window: Rect,
    scroll_on_swipe: bool,
    find_calls: usize,
    window_calls: usize,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
    gestures: Vec<Gesture>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            locators: HashMap::new(),
            children: HashMap::new(),
            displayed: HashMap::new(),
            enabled: HashMap::new(),
            selected: HashSet::new(),
            stale: HashSet::new(),
            rects: HashMap::new(),
            texts: HashMap::new(),
            tags: HashMap::new(),
            attributes: HashMap::new(),
            window: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            scroll_on_swipe: false,
            find_calls: 0,
            window_calls: 0,
            clicks: Vec::new(),
            typed: Vec::new(),
            gestures: Vec::new(),
        }
    }
}

impl MockState {
    fn live(&self, element: &ElementHandle) -> Result<(), DriverError> {
        if self.stale.contains(element.id()) {
            Err(DriverError::StaleElement(element.id().to_string()))
        } else {
            Ok(())
        }
    }

    /// Explicit display state, else whether the rect overlaps the window.
    fn is_displayed(&self, id: &str) -> bool {
        if let Some(displayed) = self.displayed.get(id) {
            return *displayed;
        }
        match self.rects.get(id) {
            Some(rect) => {
                let w = self.window;
                rect.x < w.x + w.width
                    && rect.x + rect.width > w.x
                    && rect.y < w.y + w.height
                    && rect.y + rect.height > w.y
            }
            None => true,
        }
    }

    /// Moves every element along with the finger.
    fn scroll(&mut self, dx: i32, dy: i32) {
        for rect in self.rects.values_mut() {
            rect.x += f64::from(dx);
            rect.y += f64::from(dy);
        }
    }
}

/// In-memory driver. Elements are displayed and enabled unless told otherwise.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

fn handles(ids: &[&str]) -> Vec<ElementHandle> {
    ids.iter().map(|id| ElementHandle::new(*id)).collect()
}

impl MockDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Makes `by=value` resolve to elements with the given ids, in order.
    pub fn set_locator(&self, by: By, value: &str, ids: &[&str]) {
        self.state().locators.insert((by, value.to_string()), handles(ids));
    }

    /// Makes `by=value` match nothing.
    pub fn remove_locator(&self, by: By, value: &str) {
        self.state().locators.remove(&(by, value.to_string()));
    }

    pub fn set_children(&self, parent: &str, by: By, value: &str, ids: &[&str]) {
        self.state()
            .children
            .insert((parent.to_string(), by, value.to_string()), handles(ids));
    }

    pub fn set_displayed(&self, id: &str, displayed: bool) {
        self.state().displayed.insert(id.to_string(), displayed);
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        self.state().enabled.insert(id.to_string(), enabled);
    }

    pub fn set_selected(&self, id: &str, selected: bool) {
        let mut state = self.state();
        if selected {
            state.selected.insert(id.to_string());
        } else {
            state.selected.remove(id);
        }
    }

    pub fn make_stale(&self, id: &str) {
        self.state().stale.insert(id.to_string());
    }

    pub fn set_rect(&self, id: &str, rect: Rect) {
        self.state().rects.insert(id.to_string(), rect);
    }

    pub fn set_text(&self, id: &str, text: &str) {
        self.state().texts.insert(id.to_string(), text.to_string());
    }

    pub fn set_tag(&self, id: &str, tag: &str) {
        self.state().tags.insert(id.to_string(), tag.to_string());
    }

    pub fn set_attribute(&self, id: &str, name: &str, value: &str) {
        self.state()
            .attributes
            .insert((id.to_string(), name.to_string()), value.to_string());
    }

    pub fn set_window(&self, rect: Rect) {
        self.state().window = rect;
    }

    /// Swipes and flicks drag every element rect by the stroke delta.
    pub fn scroll_on_swipe(&self) {
        self.state().scroll_on_swipe = true;
    }

    pub fn find_calls(&self) -> usize {
        self.state().find_calls
    }

    pub fn window_calls(&self) -> usize {
        self.state().window_calls
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state().typed.clone()
    }

    pub fn gestures(&self) -> Vec<Gesture> {
        self.state().gestures.clone()
    }

    pub fn rect_of(&self, id: &str) -> Option<Rect> {
        self.state().rects.get(id).copied()
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    async fn find_elements(&self, by: By, value: &str) -> Result<Vec<ElementHandle>, DriverError> {
        let mut state = self.state();
        state.find_calls += 1;
        Ok(state
            .locators
            .get(&(by, value.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        by: By,
        value: &str,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let state = self.state();
        state.live(parent)?;
        Ok(state
            .children
            .get(&(parent.id().to_string(), by, value.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state.is_displayed(element.id()))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state.enabled.get(element.id()).copied().unwrap_or(true))
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state.selected.contains(element.id()))
    }

    async fn rect(&self, element: &ElementHandle) -> Result<Rect, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state
            .rects
            .get(element.id())
            .copied()
            .unwrap_or(Rect::new(0.0, 0.0, 10.0, 10.0)))
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state.texts.get(element.id()).cloned().unwrap_or_default())
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state
            .tags
            .get(element.id())
            .cloned()
            .unwrap_or_else(|| "div".to_string()))
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(state
            .attributes
            .get(&(element.id().to_string(), name.to_string()))
            .cloned())
    }

    /// Clicking toggles the selection state, like an `<option>` of a multi-select.
    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state();
        state.live(element)?;
        let id = element.id().to_string();
        if !state.selected.remove(&id) {
            state.selected.insert(id.clone());
        }
        state.clicks.push(id);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let state = self.state();
        state.live(element)?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        state.live(element)?;
        state.typed.push((element.id().to_string(), text.to_string()));
        Ok(())
    }

    async fn window_rect(&self) -> Result<Rect, DriverError> {
        let mut state = self.state();
        state.window_calls += 1;
        Ok(state.window)
    }

    async fn swipe(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        duration_ms: u64,
    ) -> Result<(), DriverError> {
        let mut state = self.state();
        state
            .gestures
            .push(Gesture::swipe(start_x, start_y, end_x, end_y, duration_ms));
        if state.scroll_on_swipe {
            state.scroll(end_x - start_x, end_y - start_y);
        }
        Ok(())
    }

    async fn flick(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Result<(), DriverError> {
        let mut state = self.state();
        state.gestures.push(Gesture::flick(start_x, start_y, end_x, end_y));
        if state.scroll_on_swipe {
            state.scroll(end_x - start_x, end_y - start_y);
        }
        Ok(())
    }

    async fn tap(&self, points: &[Point], duration_ms: Option<u64>) -> Result<(), DriverError> {
        self.state().gestures.push(Gesture::Tap {
            points: points.to_vec(),
            duration_ms,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A page over `driver` with a 2 s timeout and the default 0.5 s poll.
pub fn page(driver: &Arc<MockDriver>) -> Page {
    Page::new(driver.clone()).with_timeout(Duration::from_secs(2))
}

pub fn locator(by: By, value: &str) -> Locator {
    Locator::new(by, value).unwrap()
}
