//! Scroll-until-visible gestures for mobile elements.
//!
//! Bringing an off-screen element into view happens in two phases:
//!
//! 1. **Coarse search.** Swipe (or flick) along a fixed stroke until the
//!    element reports itself viewable, up to `max_rounds` movements.
//! 2. **Fine alignment.** Swipe from the center of the target area toward
//!    whichever borders the element still crosses, until every element border
//!    lies inside the area or `max_align_rounds` swipes have been issued.
//!
//! Alignment strokes are clamped between `min_distance` and half the area
//! extent on each axis, so a correction is never so short that the device
//! reads it as a tap, and never so long that it overshoots past the center.
//!
//! Exhausting either phase is not an error: the [`GestureReport`] records how
//! many rounds ran, and a warning is logged.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::element::Element;
use crate::error::Result;
use crate::geometry::{Area, Border, Coordinate, Offset, Point, Region, Stroke};

/// Parameters for [`Element::swipe_by`] and [`Element::flick_by`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOptions {
    /// Search stroke, relative to `area` or absolute.
    pub offset: Coordinate,
    /// Area the element must end up in, relative to the window or absolute.
    pub area: Coordinate,
    /// Presence timeout of each visibility check during the search.
    pub timeout: Duration,
    /// Maximum search movements. `0` skips the search.
    pub max_rounds: u32,
    /// Maximum alignment swipes. `0` skips the alignment.
    pub max_align_rounds: u32,
    /// Minimum length of each axis component of an alignment swipe.
    pub min_distance: i32,
    /// Duration of search swipes and alignment swipes. Flicks have none.
    pub duration_ms: u64,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            offset: Offset::UP,
            area: Area::FULL,
            timeout: Duration::from_secs(3),
            max_rounds: 10,
            max_align_rounds: 2,
            min_distance: 100,
            duration_ms: 1000,
        }
    }
}

impl MoveOptions {
    #[must_use]
    pub fn with_offset(mut self, offset: Coordinate) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_area(mut self, area: Coordinate) -> Self {
        self.area = area;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub const fn with_max_align_rounds(mut self, max_align_rounds: u32) -> Self {
        self.max_align_rounds = max_align_rounds;
        self
    }

    #[must_use]
    pub const fn with_min_distance(mut self, min_distance: i32) -> Self {
        self.min_distance = min_distance;
        self
    }

    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Rounds executed by each phase. `None` means the phase was disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureReport {
    pub search_rounds: Option<u32>,
    pub align_rounds: Option<u32>,
}

/// How the coarse search moves the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Swipe { duration_ms: u64 },
    Flick,
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Movement::Swipe { .. } => f.write_str("swiping"),
            Movement::Flick => f.write_str("flicking"),
        }
    }
}

/// The critical points of an alignment area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentFrame {
    pub border: Border,
    /// `(half_width, half_height)`, the largest component of a correction.
    pub half_extent: (i32, i32),
    pub center: Point,
}

impl From<Region> for AlignmentFrame {
    fn from(area: Region) -> Self {
        Self {
            border: area.border(),
            half_extent: area.half_extent(),
            center: area.center(),
        }
    }
}

/// The correction swipe that moves `element` toward the inside of `frame`.
///
/// Returns `None` when no border of the element lies outside the frame.
/// Each axis component of the returned stroke is clamped to
/// `[min_distance, half_extent]` in the direction of the correction.
pub fn aligned_offset(frame: &AlignmentFrame, element: &Border, min_distance: i32) -> Option<Stroke> {
    let area = frame.border;
    let (max_x, max_y) = frame.half_extent;
    let center = frame.center;

    let dl = area.left - element.left;
    let dr = area.right - element.right;
    let dt = area.top - element.top;
    let db = area.bottom - element.bottom;
    debug!(dl, dr, dt, db, "alignment delta");

    let mut end = center;
    if dl > 0 {
        end.x = center.x + dl.min(max_x).max(min_distance);
    }
    if dr < 0 {
        end.x = center.x + dr.max(-max_x).min(-min_distance);
    }
    if dt > 0 {
        end.y = center.y + dt.min(max_y).max(min_distance);
    }
    if db < 0 {
        end.y = center.y + db.max(-max_y).min(-min_distance);
    }

    if end == center {
        return None;
    }
    Some(Stroke::between(center, end))
}

/// Phase one: move until the element is viewable.
///
/// Performs one visibility check up front and then at most `max_rounds`
/// movements, each followed by another check.
pub(crate) async fn coarse_search(
    element: &mut Element,
    stroke: Stroke,
    movement: Movement,
    timeout: Duration,
    max_rounds: u32,
) -> Result<Option<u32>> {
    if max_rounds == 0 {
        warn!(remark = %element.remark(), "max_rounds is 0, no {} performed", movement);
        return Ok(None);
    }
    debug!(remark = %element.remark(), %stroke, "start {}", movement);

    let mut round = 0;
    while !element.is_viewable(Some(timeout)).await? {
        if round == max_rounds {
            warn!(
                remark = %element.remark(),
                max_rounds,
                "stop {}, element remains not viewable", movement
            );
            return Ok(Some(round));
        }
        match movement {
            Movement::Swipe { duration_ms } => element.page().swipe(stroke, duration_ms).await?,
            Movement::Flick => element.page().flick(stroke).await?,
        }
        round += 1;
        debug!(round, "{} round done", movement);
    }
    debug!(round, "stop {}, element is viewable", movement);
    Ok(Some(round))
}

/// Phase two: swipe the element's borders inside `area`.
pub(crate) async fn fine_align(
    element: &mut Element,
    area: Region,
    max_align_rounds: u32,
    min_distance: i32,
    duration_ms: u64,
) -> Result<Option<u32>> {
    if max_align_rounds == 0 {
        debug!("max_align_rounds is 0, no alignment performed");
        return Ok(None);
    }
    let frame = AlignmentFrame::from(area);
    debug!(?frame, "start aligning");

    let mut round = 0;
    loop {
        let border = element.border().await?;
        let Some(stroke) = aligned_offset(&frame, &border, min_distance) else {
            break;
        };
        if round == max_align_rounds {
            debug!(max_align_rounds, "stop aligning after max rounds");
            return Ok(Some(round));
        }
        element.page().swipe(stroke, duration_ms).await?;
        round += 1;
        debug!(round, %stroke, "aligning round done");
    }
    debug!(round, "stop aligning, element is inside the area");
    Ok(Some(round))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> AlignmentFrame {
        AlignmentFrame::from(Region::new(0, 0, 1000, 1000))
    }

    fn border(left: i32, right: i32, top: i32, bottom: i32) -> Border {
        Border { left, right, top, bottom }
    }

    #[test]
    fn test_inside_area_needs_no_alignment() {
        assert_eq!(aligned_offset(&frame(), &border(100, 200, 300, 400), 100), None);
        // Touching the edges still counts as inside.
        assert_eq!(aligned_offset(&frame(), &border(0, 1000, 0, 1000), 100), None);
    }

    #[test]
    fn test_right_and_top_overflow() {
        // Element border (900, 1100, 50, 150) against area (0, 0, 1000, 1000):
        // dr = -100 and nothing else is out of bounds.
        let stroke = aligned_offset(&frame(), &border(900, 1100, 50, 150), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 400, 500));
    }

    #[test]
    fn test_small_delta_is_raised_to_min_distance() {
        // Only 10 px past the bottom, corrected by the full minimum.
        let stroke = aligned_offset(&frame(), &border(100, 200, 900, 1010), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 500, 400));

        let stroke = aligned_offset(&frame(), &border(-5, 200, 100, 200), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 600, 500));
    }

    #[test]
    fn test_large_delta_is_capped_at_half_extent() {
        let stroke = aligned_offset(&frame(), &border(100, 200, -3000, -2900), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 500, 1000));

        let stroke = aligned_offset(&frame(), &border(2000, 2100, 100, 200), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 0, 500));
    }

    #[test]
    fn test_right_overrides_left_when_both_overflow() {
        // Wider than the area: the right-hand correction is applied last.
        let stroke = aligned_offset(&frame(), &border(-50, 1200, 100, 200), 100).unwrap();
        assert_eq!(stroke, Stroke::new(500, 500, 300, 500));
    }

    #[test]
    fn test_offset_area_frame() {
        let frame = AlignmentFrame::from(Region::new(100, 200, 400, 600));
        assert_eq!(frame.center, Point::new(300, 500));
        assert_eq!(frame.half_extent, (200, 300));
        let stroke = aligned_offset(&frame, &border(150, 250, 700, 900), 50).unwrap();
        // db = 800 - 900 = -100
        assert_eq!(stroke, Stroke::new(300, 500, 300, 400));
    }

    #[test]
    fn test_move_options_defaults_and_builders() {
        let options = MoveOptions::default();
        assert_eq!(options.offset, Offset::UP);
        assert_eq!(options.area, Area::FULL);
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.max_rounds, 10);
        assert_eq!(options.max_align_rounds, 2);
        assert_eq!(options.min_distance, 100);
        assert_eq!(options.duration_ms, 1000);

        let options = options.with_max_rounds(0).with_offset(Offset::DOWN).with_duration_ms(300);
        assert_eq!(options.max_rounds, 0);
        assert_eq!(options.offset, Offset::DOWN);
        assert_eq!(options.duration_ms, 300);
    }

    #[test]
    fn test_movement_display() {
        assert_eq!(Movement::Swipe { duration_ms: 1 }.to_string(), "swiping");
        assert_eq!(Movement::Flick.to_string(), "flicking");
    }
}
