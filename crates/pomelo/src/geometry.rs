//! Geometry types shared by the resolvers and the gesture engine.
//!
//! Driver-reported rectangles ([`Rect`]) are in device pixels and may carry
//! fractional values. Everything the gesture engine computes is in whole
//! pixels ([`Region`], [`Border`], [`Point`], [`Stroke`]), truncated toward
//! zero the same way at every step.
//!
//! Areas and offsets are described with [`Coordinate`], which is either
//! absolute (pixels) or relative (fractions in `[0, 1]` of an enclosing
//! rectangle).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The frame (position and size) of an element or window.
///
/// Coordinates are in device pixels with the origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// The x-coordinate of the top-left corner.
    pub x: f64,
    /// The y-coordinate of the top-left corner.
    pub y: f64,
    /// The width in pixels.
    pub width: f64,
    /// The height in pixels.
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// `(left, right, top, bottom)`, truncated to whole pixels.
    pub fn border(&self) -> Border {
        Border {
            left: self.x as i32,
            right: (self.x + self.width) as i32,
            top: self.y as i32,
            bottom: (self.y + self.height) as i32,
        }
    }

    /// The center point, truncated to whole pixels.
    pub fn center(&self) -> Point {
        Point {
            x: (self.x + self.width / 2.0) as i32,
            y: (self.y + self.height / 2.0) as i32,
        }
    }
}

/// The four edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Border {
    /// Whether `inner` lies entirely within `self`, edges included.
    pub fn contains(&self, inner: &Border) -> bool {
        self.left <= inner.left
            && self.right >= inner.right
            && self.top <= inner.top
            && self.bottom >= inner.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An absolute rectangle in whole pixels, `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn border(&self) -> Border {
        Border {
            left: self.x,
            right: self.x.saturating_add(self.width),
            top: self.y,
            bottom: self.y.saturating_add(self.height),
        }
    }

    /// Half the width and half the height, truncated.
    pub fn half_extent(&self) -> (i32, i32) {
        (self.width / 2, self.height / 2)
    }

    /// `(x + half_width, y + half_height)`.
    pub fn center(&self) -> Point {
        let (half_w, half_h) = self.half_extent();
        Point::new(self.x + half_w, self.y + half_h)
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::new(rect.x as i32, rect.y as i32, rect.width as i32, rect.height as i32)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

/// A straight movement from a start point to an end point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stroke {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl Stroke {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self { start_x, start_y, end_x, end_y }
    }

    pub fn between(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) -> ({}, {})",
            self.start_x, self.start_y, self.end_x, self.end_y
        )
    }
}

/// A four-component area `(x, y, width, height)` or offset
/// `(start_x, start_y, end_x, end_y)`.
///
/// Relative components are fractions of the enclosing rectangle: the window
/// for areas, the resolved area for offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Absolute(i32, i32, i32, i32),
    Relative(f64, f64, f64, f64),
}

impl Coordinate {
    pub fn absolute(a: i32, b: i32, c: i32, d: i32) -> Self {
        Coordinate::Absolute(a, b, c, d)
    }

    /// Creates a relative coordinate, rejecting components outside `[0, 1]`.
    pub fn relative(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let coordinate = Coordinate::Relative(a, b, c, d);
        coordinate.validate("coordinate")?;
        Ok(coordinate)
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Coordinate::Relative(..))
    }

    fn validate(&self, name: &str) -> Result<()> {
        if let Coordinate::Relative(a, b, c, d) = *self {
            let in_unit = |v: f64| (0.0..=1.0).contains(&v);
            if ![a, b, c, d].into_iter().all(in_unit) {
                return Err(Error::Config(format!(
                    "All \"{}\" values are floats and should be between \"0.0\" and \"1.0\", got ({}, {}, {}, {}).",
                    name, a, b, c, d
                )));
            }
        }
        Ok(())
    }

    /// Resolves an area against the window rect.
    ///
    /// Absolute areas are returned unchanged and never consult `window`.
    pub fn resolve_area(&self, window: &Rect) -> Result<Region> {
        self.validate("area")?;
        Ok(match *self {
            Coordinate::Absolute(x, y, width, height) => Region::new(x, y, width, height),
            Coordinate::Relative(x, y, width, height) => Region::new(
                (window.x + window.width * x) as i32,
                (window.y + window.height * y) as i32,
                (window.width * width) as i32,
                (window.height * height) as i32,
            ),
        })
    }

    /// Resolves an offset against an already resolved area.
    pub fn resolve_offset(&self, area: &Region) -> Result<Stroke> {
        self.validate("offset")?;
        Ok(match *self {
            Coordinate::Absolute(sx, sy, ex, ey) => Stroke::new(sx, sy, ex, ey),
            Coordinate::Relative(sx, sy, ex, ey) => {
                let (ax, ay) = (area.x as f64, area.y as f64);
                let (aw, ah) = (area.width as f64, area.height as f64);
                Stroke::new(
                    (ax + aw * sx) as i32,
                    (ay + ah * sy) as i32,
                    (ax + aw * ex) as i32,
                    (ay + ah * ey) as i32,
                )
            }
        })
    }
}

impl From<Region> for Coordinate {
    fn from(region: Region) -> Self {
        Coordinate::Absolute(region.x, region.y, region.width, region.height)
    }
}

impl From<Rect> for Coordinate {
    fn from(rect: Rect) -> Self {
        Region::from(rect).into()
    }
}

impl From<Stroke> for Coordinate {
    fn from(stroke: Stroke) -> Self {
        Coordinate::Absolute(stroke.start_x, stroke.start_y, stroke.end_x, stroke.end_y)
    }
}

/// Preset relative offsets `(start_x, start_y, end_x, end_y)`.
///
/// Named after the direction the content moves, e.g. [`Offset::UP`] drags
/// from the lower quarter to the upper quarter.
pub struct Offset;

impl Offset {
    pub const UP: Coordinate = Coordinate::Relative(0.5, 0.75, 0.5, 0.25);
    pub const DOWN: Coordinate = Coordinate::Relative(0.5, 0.25, 0.5, 0.75);
    pub const LEFT: Coordinate = Coordinate::Relative(0.75, 0.5, 0.25, 0.5);
    pub const RIGHT: Coordinate = Coordinate::Relative(0.25, 0.5, 0.75, 0.5);
    pub const UPPER_LEFT: Coordinate = Coordinate::Relative(0.75, 0.75, 0.25, 0.25);
    pub const UPPER_RIGHT: Coordinate = Coordinate::Relative(0.25, 0.75, 0.75, 0.25);
    pub const LOWER_LEFT: Coordinate = Coordinate::Relative(0.75, 0.25, 0.25, 0.75);
    pub const LOWER_RIGHT: Coordinate = Coordinate::Relative(0.25, 0.25, 0.75, 0.75);
}

/// Preset relative areas `(x, y, width, height)`.
pub struct Area;

impl Area {
    /// The whole window.
    pub const FULL: Coordinate = Coordinate::Relative(0.0, 0.0, 1.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_border_and_center_truncate() {
        let rect = Rect::new(10.6, 20.2, 100.5, 50.9);
        assert_eq!(
            rect.border(),
            Border { left: 10, right: 111, top: 20, bottom: 71 }
        );
        assert_eq!(rect.center(), Point::new(60, 45));
    }

    #[test]
    fn test_relative_area_resolves_against_window() {
        let window = Rect::new(10.0, 20.0, 500.0, 1000.0);
        let area = Coordinate::relative(0.1, 0.2, 0.6, 0.7)
            .unwrap()
            .resolve_area(&window)
            .unwrap();
        assert_eq!(area, Region::new(60, 220, 300, 700));
    }

    #[test]
    fn test_region_border_saturates_at_extremes() {
        let region = Region::new(i32::MAX - 10, i32::MAX - 5, 100, 100);
        assert_eq!(
            region.border(),
            Border { left: i32::MAX - 10, right: i32::MAX, top: i32::MAX - 5, bottom: i32::MAX }
        );
    }

    #[test]
    fn test_absolute_area_ignores_window() {
        let window = Rect::new(0.0, 0.0, 1.0, 1.0);
        let area = Coordinate::absolute(100, 150, 300, 700).resolve_area(&window).unwrap();
        assert_eq!(area, Region::new(100, 150, 300, 700));
    }

    #[test]
    fn test_relative_offset_resolves_against_area() {
        let area = Region::new(0, 0, 1000, 2000);
        let stroke = Offset::UP.resolve_offset(&area).unwrap();
        assert_eq!(stroke, Stroke::new(500, 1500, 500, 500));
    }

    #[test]
    fn test_out_of_unit_relative_rejected() {
        assert!(matches!(
            Coordinate::relative(0.5, 1.5, 0.5, 0.2),
            Err(Error::Config(_))
        ));
        let raw = Coordinate::Relative(-0.1, 0.0, 1.0, 1.0);
        let window = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(raw.resolve_area(&window), Err(Error::Config(_))));
    }

    #[test]
    fn test_region_center_and_half_extent() {
        let region = Region::new(0, 0, 1001, 999);
        assert_eq!(region.half_extent(), (500, 499));
        assert_eq!(region.center(), Point::new(500, 499));
        assert_eq!(
            region.border(),
            Border { left: 0, right: 1001, top: 0, bottom: 999 }
        );
    }

    #[test]
    fn test_coordinate_json_forms() {
        let abs: Coordinate = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(abs, Coordinate::Absolute(1, 2, 3, 4));
        let rel: Coordinate = serde_json::from_str("[0.5, 0.75, 0.5, 0.25]").unwrap();
        assert_eq!(rel, Offset::UP);
    }

    #[test]
    fn test_border_contains() {
        let outer = Border { left: 0, right: 100, top: 0, bottom: 100 };
        assert!(outer.contains(&Border { left: 0, right: 100, top: 10, bottom: 90 }));
        assert!(!outer.contains(&Border { left: -1, right: 50, top: 10, bottom: 90 }));
    }
}
