//! Transparent, click-through overlay that tracks the target window.
//!
//! The surface owns two layer groups (grid and annotation) on top of a
//! persistent border. Groups are never diffed: every change clears the
//! group and rebuilds it from scratch.

use tracing::{debug, instrument, trace};

use crate::common::config::ColorSettings;
use crate::layout_engine::{clamp_columns, grid_line_offsets, subdivide};
use crate::model::Rect;
use crate::sys::screen::CoordinateConverter;

pub const ANNOTATION_SUBGRID_COLUMNS: u32 = 20;
pub const ANNOTATION_SUBGRID_ROWS: u32 = 12;
const ANNOTATION_BORDER_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GRID: Color = Color::rgba(1.0, 0.0, 0.0, 0.45);
    pub const ANNOTATION: Color = Color::rgba(1.0, 0.85, 0.0, 1.0);
    pub const SUBGRID: Color = Color::rgba(1.0, 1.0, 1.0, 0.18);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self { Self { r, g, b, a } }
}

impl From<ColorSettings> for Color {
    fn from(c: ColorSettings) -> Self { Color::rgba(c.r, c.g, c.b, c.a) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    pub width: f64,
    pub color: Color,
}

/// A single primitive the canvas knows how to draw, in overlay-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drawable {
    Fill { rect: Rect, color: Color },
    Stroke { rect: Rect, width: f64, color: Color },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("failed to construct overlay surface: {0}")]
    Construction(String),
    #[error("overlay surface update failed: {0}")]
    Update(String),
}

/// Platform drawing backend behind the overlay.
pub trait Canvas {
    type Layer;

    /// Moves and resizes the surface. `native` is already in the platform's
    /// coordinate convention.
    fn set_frame(&mut self, native: Rect) -> Result<(), SurfaceError>;
    fn apply_border(&mut self, style: &BorderStyle);
    fn add_layer(&mut self, drawable: &Drawable) -> Self::Layer;
    fn remove_layer(&mut self, layer: Self::Layer);
    fn present(&mut self) -> Result<(), SurfaceError>;
    fn order_front(&mut self) -> Result<(), SurfaceError>;
    fn order_out(&mut self) -> Result<(), SurfaceError>;
}

/// Owned handles of one visual group.
pub struct LayerGroup<L> {
    layers: Vec<L>,
}

impl<L> Default for LayerGroup<L> {
    fn default() -> Self { Self { layers: Vec::new() } }
}

impl<L> LayerGroup<L> {
    pub fn len(&self) -> usize { self.layers.len() }

    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    pub fn clear<C: Canvas<Layer = L>>(&mut self, canvas: &mut C) {
        for layer in self.layers.drain(..) {
            canvas.remove_layer(layer);
        }
    }

    pub fn rebuild<C: Canvas<Layer = L>>(&mut self, canvas: &mut C, drawables: Vec<Drawable>) {
        self.clear(canvas);
        for drawable in drawables {
            self.layers.push(canvas.add_layer(&drawable));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    /// Global position and size of the surface.
    pub frame: Rect,
    pub border_width: f64,
    pub grid_enabled: bool,
    pub grid_columns: u32,
    pub annotation_enabled: bool,
    pub annotation_rect: Option<Rect>,
    pub visible: bool,
}

pub struct OverlaySurface<C: Canvas> {
    canvas: C,
    converter: CoordinateConverter,
    border: BorderStyle,
    state: OverlayState,
    grid: LayerGroup<C::Layer>,
    annotation: LayerGroup<C::Layer>,
}

impl<C: Canvas> OverlaySurface<C> {
    /// Wraps a freshly constructed canvas. The surface starts hidden.
    pub fn create(mut canvas: C, converter: CoordinateConverter, border: BorderStyle) -> Self {
        canvas.apply_border(&border);
        Self {
            canvas,
            converter,
            border,
            state: OverlayState {
                frame: Rect::default(),
                border_width: border.width,
                grid_enabled: false,
                grid_columns: clamp_columns(0),
                annotation_enabled: false,
                annotation_rect: None,
                visible: false,
            },
            grid: LayerGroup::default(),
            annotation: LayerGroup::default(),
        }
    }

    pub fn state(&self) -> &OverlayState { &self.state }

    pub fn grid_layers(&self) -> &LayerGroup<C::Layer> { &self.grid }

    pub fn annotation_layers(&self) -> &LayerGroup<C::Layer> { &self.annotation }

    #[instrument(level = "trace", skip(self))]
    pub fn show_at(&mut self, global: Rect) -> Result<(), SurfaceError> {
        let native = self.converter.to_native(global);
        self.canvas.set_frame(native)?;
        let resized = self.state.frame != global;
        self.state.frame = global;
        self.canvas.apply_border(&self.border);
        if self.state.grid_enabled {
            self.rebuild_grid();
        }
        self.canvas.present()?;
        self.canvas.order_front()?;
        if !self.state.visible || resized {
            debug!(frame = %global, "overlay shown");
        }
        self.state.visible = true;
        Ok(())
    }

    pub fn hide(&mut self) -> Result<(), SurfaceError> {
        if !self.state.visible {
            return Ok(());
        }
        self.canvas.order_out()?;
        self.state.visible = false;
        debug!("overlay hidden");
        Ok(())
    }

    pub fn set_grid(&mut self, enabled: bool, columns: u32) -> Result<(), SurfaceError> {
        self.state.grid_enabled = enabled;
        self.state.grid_columns = clamp_columns(columns);
        if enabled {
            self.rebuild_grid();
        } else {
            self.grid.clear(&mut self.canvas);
        }
        self.present_if_visible()
    }

    /// A `None` rect while enabled is treated as disabled.
    pub fn set_annotation(&mut self, enabled: bool, local: Option<Rect>) -> Result<(), SurfaceError> {
        match local.filter(|_| enabled) {
            Some(rect) => {
                self.state.annotation_enabled = true;
                self.state.annotation_rect = Some(rect);
                self.annotation.rebuild(&mut self.canvas, annotation_drawables(rect));
            }
            None => {
                self.state.annotation_enabled = false;
                self.state.annotation_rect = None;
                self.annotation.clear(&mut self.canvas);
            }
        }
        self.present_if_visible()
    }

    fn rebuild_grid(&mut self) {
        let drawables = grid_drawables(self.state.frame.local(), self.state.grid_columns);
        trace!(lines = drawables.len(), "rebuilding grid");
        self.grid.rebuild(&mut self.canvas, drawables);
    }

    fn present_if_visible(&mut self) -> Result<(), SurfaceError> {
        if self.state.visible {
            self.canvas.present()?;
        }
        Ok(())
    }
}

/// Vertical full-height lines splitting `surface` into `columns` equal columns.
pub fn grid_drawables(surface: Rect, columns: u32) -> Vec<Drawable> {
    grid_line_offsets(surface.width, columns)
        .into_iter()
        .map(|x| Drawable::Fill {
            rect: Rect::new(surface.x + x, surface.y, 1, surface.height),
            color: Color::GRID,
        })
        .collect()
}

/// Bordered rectangle plus a fixed thin sub-grid inside it.
pub fn annotation_drawables(rect: Rect) -> Vec<Drawable> {
    let mut out = vec![Drawable::Stroke {
        rect,
        width: ANNOTATION_BORDER_WIDTH,
        color: Color::ANNOTATION,
    }];
    out.extend(subdivide(rect.width, ANNOTATION_SUBGRID_COLUMNS).into_iter().map(|x| {
        Drawable::Fill {
            rect: Rect::new(rect.x + x, rect.y, 1, rect.height),
            color: Color::SUBGRID,
        }
    }));
    out.extend(subdivide(rect.height, ANNOTATION_SUBGRID_ROWS).into_iter().map(|y| {
        Drawable::Fill {
            rect: Rect::new(rect.x, rect.y + y, rect.width, 1),
            color: Color::SUBGRID,
        }
    }));
    out
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::testing::{Order, RecordingCanvas, border};
    use super::*;

    fn surface() -> (OverlaySurface<RecordingCanvas>, RecordingCanvas) {
        let canvas = RecordingCanvas::default();
        let surface =
            OverlaySurface::create(canvas.clone(), CoordinateConverter::identity(), border());
        (surface, canvas)
    }

    fn xs(drawables: &[Drawable]) -> Vec<i32> {
        drawables
            .iter()
            .map(|d| match d {
                Drawable::Fill { rect, .. } | Drawable::Stroke { rect, .. } => rect.x,
            })
            .collect()
    }

    #[test]
    fn created_hidden_with_border() {
        let (surface, canvas) = surface();
        assert!(!surface.state().visible);
        assert_eq!(surface.state().border_width, 4.0);
        assert_eq!(canvas.log.borrow().borders, vec![border()]);
        assert!(canvas.log.borrow().orders.is_empty());
    }

    #[test]
    fn show_at_moves_and_orders_front() {
        let (mut surface, canvas) = surface();
        surface.show_at(Rect::new(96, 46, 808, 608)).unwrap();
        let log = canvas.log.borrow();
        assert_eq!(log.frames, vec![Rect::new(96, 46, 808, 608)]);
        assert!(log.is_front());
        assert_eq!(log.borders.len(), 2);
        assert!(surface.state().visible);
        assert_eq!(surface.state().frame, Rect::new(96, 46, 808, 608));
    }

    #[test]
    fn show_at_converts_through_the_converter() {
        let canvas = RecordingCanvas::default();
        let mut surface =
            OverlaySurface::create(canvas.clone(), CoordinateConverter::from_height(1080), border());
        surface.show_at(Rect::new(96, 46, 808, 608)).unwrap();
        assert_eq!(canvas.log.borrow().frames, vec![Rect::new(96, 1034, 808, 608)]);
        assert_eq!(surface.state().frame, Rect::new(96, 46, 808, 608));
    }

    #[test]
    fn grid_lines_for_ten_columns() {
        let (mut surface, canvas) = surface();
        surface.show_at(Rect::new(96, 46, 808, 608)).unwrap();
        surface.set_grid(true, 10).unwrap();
        let live = canvas.log.borrow().live_drawables();
        assert_eq!(xs(&live), vec![81, 162, 242, 323, 404, 485, 566, 646, 727]);
        assert!(live.iter().all(|d| matches!(
            d,
            Drawable::Fill { rect, .. } if rect.y == 0 && rect.height == 608 && rect.width == 1
        )));
    }

    #[test]
    fn show_at_twice_keeps_layer_counts() {
        let (mut surface, canvas) = surface();
        surface.set_grid(true, 10).unwrap();
        surface.set_annotation(true, Some(Rect::new(10, 10, 200, 120))).unwrap();
        surface.show_at(Rect::new(0, 0, 500, 400)).unwrap();
        let once = canvas.log.borrow().live_drawables();
        surface.show_at(Rect::new(0, 0, 500, 400)).unwrap();
        let twice = canvas.log.borrow().live_drawables();
        assert_eq!(once, twice);
        assert_eq!(surface.grid_layers().len(), 9);
        assert_eq!(surface.annotation_layers().len(), 31);
    }

    #[test]
    fn grid_toggle_reproduces_fresh_layer_set() {
        let (mut fresh, fresh_canvas) = surface();
        fresh.show_at(Rect::new(0, 0, 808, 608)).unwrap();
        fresh.set_grid(true, 10).unwrap();

        let (mut toggled, toggled_canvas) = surface();
        toggled.show_at(Rect::new(0, 0, 808, 608)).unwrap();
        toggled.set_grid(true, 4).unwrap();
        toggled.set_grid(false, 10).unwrap();
        assert!(toggled.grid_layers().is_empty());
        toggled.set_grid(true, 10).unwrap();

        assert_eq!(
            toggled_canvas.log.borrow().live_drawables(),
            fresh_canvas.log.borrow().live_drawables()
        );
    }

    #[test]
    fn grid_columns_clamped_to_two() {
        let (mut surface, canvas) = surface();
        surface.show_at(Rect::new(0, 0, 100, 100)).unwrap();
        surface.set_grid(true, 1).unwrap();
        assert_eq!(surface.state().grid_columns, 2);
        assert_eq!(xs(&canvas.log.borrow().live_drawables()), vec![50]);
    }

    #[test]
    fn grid_follows_resize() {
        let (mut surface, canvas) = surface();
        surface.set_grid(true, 2).unwrap();
        surface.show_at(Rect::new(0, 0, 100, 100)).unwrap();
        surface.show_at(Rect::new(0, 0, 300, 100)).unwrap();
        assert_eq!(xs(&canvas.log.borrow().live_drawables()), vec![150]);
    }

    #[test]
    fn annotation_draws_border_and_subgrid() {
        let (mut surface, canvas) = surface();
        let rect = Rect::new(676, 469, 106, 93);
        surface.set_annotation(true, Some(rect)).unwrap();
        let live = canvas.log.borrow().live_drawables();
        assert_eq!(live.len(), 1 + 19 + 11);
        assert_eq!(
            live[0],
            Drawable::Stroke { rect, width: ANNOTATION_BORDER_WIDTH, color: Color::ANNOTATION }
        );
        for d in &live[1..] {
            let Drawable::Fill { rect: line, color } = d else { panic!("unexpected {d:?}") };
            assert!(rect.contains_rect(*line));
            assert!(color.a < 0.5);
        }
        assert_eq!(surface.state().annotation_rect, Some(rect));
    }

    #[test]
    fn annotation_none_while_enabled_is_disabled() {
        let (mut surface, canvas) = surface();
        surface.set_annotation(true, Some(Rect::new(0, 0, 40, 40))).unwrap();
        surface.set_annotation(true, None).unwrap();
        assert!(canvas.log.borrow().live.is_empty());
        assert!(!surface.state().annotation_enabled);
        assert_eq!(surface.state().annotation_rect, None);
    }

    #[test]
    fn hide_is_idempotent() {
        let (mut surface, canvas) = surface();
        surface.hide().unwrap();
        assert!(canvas.log.borrow().orders.is_empty());
        surface.show_at(Rect::new(0, 0, 10, 10)).unwrap();
        surface.hide().unwrap();
        surface.hide().unwrap();
        assert_eq!(canvas.log.borrow().orders, vec![Order::Front, Order::Out]);
        assert!(!surface.state().visible);
    }

    #[test]
    fn hidden_surface_does_not_present() {
        let (mut surface, canvas) = surface();
        surface.set_grid(true, 3).unwrap();
        surface.set_annotation(false, None).unwrap();
        assert_eq!(canvas.log.borrow().presents, 0);
    }

    #[test]
    fn failed_move_leaves_state_untouched() {
        let (mut surface, canvas) = surface();
        canvas.log.borrow_mut().fail_set_frame = true;
        assert!(matches!(
            surface.show_at(Rect::new(1, 2, 3, 4)),
            Err(SurfaceError::Update(_))
        ));
        assert!(!surface.state().visible);
        assert_eq!(surface.state().frame, Rect::default());
    }
}
