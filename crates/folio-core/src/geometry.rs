#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A point in CSS pixels.
///
/// Coordinates are relative to whatever container the caller measured
/// against (origin at top-left, `y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `other`.
    ///
    /// `t = 0` returns `self`, `t = 1` returns `other`. `t` is not clamped.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// An axis-aligned rectangle in CSS pixels.
///
/// Mirrors the shape of a DOM bounding rect: `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centre of the rectangle.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Centre of this rectangle expressed relative to `container`'s top-left.
    ///
    /// Both rectangles must be in the same coordinate space (for example
    /// viewport coordinates from `getBoundingClientRect`).
    #[inline]
    #[must_use]
    pub fn center_within(&self, container: &Rect) -> Point {
        let c = self.center();
        Point::new(c.x - container.x, c.y - container.y)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point::new(0.0, 10.0);
        let b = Point::new(20.0, 30.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(10.0, 20.0));
    }

    #[test]
    fn center_within_container() {
        let container = Rect::new(100.0, 50.0, 480.0, 2000.0);
        let node = Rect::new(152.0, 102.0, 16.0, 16.0);
        assert_eq!(node.center_within(&container), Point::new(60.0, 60.0));
    }

    #[test]
    fn empty_rect() {
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
