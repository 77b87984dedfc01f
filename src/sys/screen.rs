use crate::model::Rect;

/// Converts global top-left, Y-down rectangles into a surface's native
/// convention.
///
/// With a screen height, the native origin is the rectangle's top-left
/// corner measured upward from the bottom of the main display (AppKit's
/// `setFrameTopLeftPoint:`). Without one, native coordinates are the global
/// ones, which is what SkyLight windows use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CoordinateConverter {
    screen_height: Option<i32>,
}

impl CoordinateConverter {
    pub fn identity() -> Self { Self { screen_height: None } }

    pub fn from_height(height: i32) -> Self { Self { screen_height: Some(height) } }

    #[cfg(test)]
    pub(crate) fn screen_height(&self) -> Option<i32> { self.screen_height }

    pub fn to_native(&self, global: Rect) -> Rect {
        match self.screen_height {
            Some(height) => Rect::new(global.x, height - global.y, global.width, global.height),
            None => global,
        }
    }
}
