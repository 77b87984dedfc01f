//! Maps target window bounds to every rectangle the overlay layers need.
//!
//! All functions here are pure and work in the global top-left, Y-down space,
//! except for the annotation rectangle which is local to the overlay.

use crate::common::config::{
    AnnotationSettings, Config, MAX_MARGIN, MAX_PANEL_GAP, MAX_PANEL_WIDTH,
};
use crate::model::Rect;
use crate::model::rect::round_px;

pub const MIN_GRID_COLUMNS: u32 = 2;

/// Annotation placement as fractions of the target window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationFractions {
    pub right: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&AnnotationSettings> for AnnotationFractions {
    fn from(pct: &AnnotationSettings) -> Self {
        Self {
            right: pct.right / 100.0,
            top: pct.top / 100.0,
            width: pct.width / 100.0,
            height: pct.height / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelParams {
    pub gap: i32,
    pub width: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub margin: i32,
    /// `None` when the side panel is disabled.
    pub panel: Option<PanelParams>,
    pub grid_columns: u32,
    pub annotation: AnnotationFractions,
}

impl From<&Config> for LayoutParams {
    fn from(config: &Config) -> Self {
        let panel = config.panel.enabled.then(|| PanelParams {
            gap: pixels(config.panel.gap, MAX_PANEL_GAP),
            width: pixels(config.panel.width, MAX_PANEL_WIDTH),
        });
        Self {
            margin: pixels(config.overlay.margin, MAX_MARGIN),
            panel,
            grid_columns: clamp_columns(config.grid.columns),
            annotation: AnnotationFractions::from(&config.annotation),
        }
    }
}

/// Configured length capped at `max` so tick arithmetic cannot overflow.
pub fn pixels(value: u32, max: u32) -> i32 {
    i32::try_from(value.min(max)).unwrap_or(i32::MAX)
}

/// Everything derived from one set of target bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedLayout {
    pub outer: Rect,
    pub panel: Option<Rect>,
    pub grid_columns: u32,
    /// Overlay-local.
    pub annotation: Option<Rect>,
}

pub fn outer_rect(bounds: Rect, margin: i32) -> Rect {
    Rect::new(
        bounds.x - margin,
        bounds.y - margin,
        bounds.width + 2 * margin,
        bounds.height + 2 * margin,
    )
}

pub fn panel_rect(bounds: Rect, margin: i32, gap: i32, width: i32) -> Rect {
    Rect::new(bounds.max_x() + margin + gap, bounds.y, width, bounds.height + 2 * margin)
}

/// Minimap annotation rectangle, local to the overlay whose origin is the
/// outer rect's origin. Returns `None` when the rounded size is empty.
pub fn annotation_rect(bounds: Rect, margin: i32, pct: AnnotationFractions) -> Option<Rect> {
    let w = bounds.width as f64;
    let h = bounds.height as f64;
    let mm_w = round_px(w * pct.width);
    let mm_h = round_px(h * pct.height);
    if mm_w <= 0 || mm_h <= 0 {
        return None;
    }
    let mm_right = round_px(w * pct.right);
    let mm_top = round_px(h * pct.top);

    let local_x = bounds.width - mm_right - mm_w + margin;
    let local_y = margin + bounds.height - mm_top - mm_h;

    // Rounding can push the rect a pixel past the overlay edge when the margin is 0.
    let overlay = outer_rect(bounds, margin).local();
    let rect = Rect::new(local_x, local_y, mm_w, mm_h).clamp_to(overlay);
    (!rect.is_empty()).then_some(rect)
}

/// Offsets of the `parts - 1` interior boundaries when splitting `len` into
/// `parts` equal spans, rounded to whole pixels.
pub fn subdivide(len: i32, parts: u32) -> Vec<i32> {
    if parts < 2 {
        return Vec::new();
    }
    (1..parts).map(|i| round_px(i as f64 * len as f64 / parts as f64)).collect()
}

/// X offsets of the vertical grid lines on a surface `width` pixels wide.
pub fn grid_line_offsets(width: i32, columns: u32) -> Vec<i32> {
    subdivide(width, clamp_columns(columns))
}

pub fn clamp_columns(columns: u32) -> u32 { columns.max(MIN_GRID_COLUMNS) }

pub const PANEL_BUTTON_HEIGHT: i32 = 40;
const PANEL_BUTTON_PAD_X: i32 = 10;
const PANEL_BUTTON_PAD_Y: i32 = 6;

/// Panel-local rectangles of the stacked buttons inside a `width` x `height`
/// panel whose frame is `inset` pixels thick. Buttons that do not fit are
/// dropped.
pub fn panel_button_slots(width: i32, height: i32, inset: i32, count: usize) -> Vec<Rect> {
    let x = inset + PANEL_BUTTON_PAD_X;
    let button_width = width - 2 * x;
    if button_width <= 0 {
        return Vec::new();
    }
    let pitch = PANEL_BUTTON_HEIGHT + 2 * PANEL_BUTTON_PAD_Y;
    (0..count as i32)
        .map(|i| {
            let y = inset + PANEL_BUTTON_PAD_Y + i * pitch;
            Rect::new(x, y, button_width, PANEL_BUTTON_HEIGHT)
        })
        .take_while(|slot| slot.max_y() <= height - inset)
        .collect()
}

pub fn resolve(bounds: Rect, params: &LayoutParams) -> DerivedLayout {
    let margin = params.margin;
    DerivedLayout {
        outer: outer_rect(bounds, margin),
        panel: params.panel.map(|p| panel_rect(bounds, margin, p.gap, p.width)),
        grid_columns: clamp_columns(params.grid_columns),
        annotation: annotation_rect(bounds, margin, params.annotation),
    }
}
