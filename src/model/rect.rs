//! Integer-pixel rectangles in the global top-left, Y-down coordinate space.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn max_x(&self) -> i32 { self.x + self.width }

    #[inline]
    pub fn max_y(&self) -> i32 { self.y + self.height }

    #[inline]
    pub fn area(&self) -> i64 { self.width as i64 * self.height as i64 }

    /// True when either dimension is zero or negative.
    #[inline]
    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    /// The same size anchored at the origin.
    #[inline]
    pub fn local(&self) -> Rect { Rect::new(0, 0, self.width, self.height) }

    pub fn contains_rect(&self, other: Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.max_x() >= other.max_x()
            && self.max_y() >= other.max_y()
    }

    /// Clips `self` to `bounds`. The result may be empty.
    pub fn clamp_to(&self, bounds: Rect) -> Rect {
        let min_x = self.x.max(bounds.x);
        let min_y = self.y.max(bounds.y);
        let max_x = self.max_x().min(bounds.max_x());
        let max_y = self.max_y().min(bounds.max_y());
        Rect::new(min_x, min_y, (max_x - min_x).max(0), (max_y - min_y).max(0))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Rounds to the nearest pixel, halves away from zero.
#[inline]
pub fn round_px(value: f64) -> i32 { value.round() as i32 }
