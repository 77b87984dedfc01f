//! converting between Core Graphics geometry and pixel rects

use objc2_core_foundation as ic;

use crate::model::Rect;
use crate::model::rect::round_px;

pub trait ToRect {
    /// Rounds each edge to the nearest pixel, so the size is
    /// `round(max) - round(min)` rather than the rounded size.
    fn to_rect(&self) -> Rect;
}

impl ToRect for ic::CGRect {
    fn to_rect(&self) -> Rect {
        let min_x = round_px(self.min().x);
        let min_y = round_px(self.min().y);
        let max_x = round_px(self.max().x);
        let max_y = round_px(self.max().y);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl From<Rect> for ic::CGRect {
    fn from(rect: Rect) -> Self {
        ic::CGRect::new(
            ic::CGPoint::new(rect.x as f64, rect.y as f64),
            ic::CGSize::new(rect.width as f64, rect.height as f64),
        )
    }
}
