//! SkyLight-backed [`Canvas`]: a borderless, click-through window whose
//! CALayer tree is rendered into the window context on every present.

use objc2::rc::Retained;
use objc2_app_kit::{NSColor, NSPopUpMenuWindowLevel};
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_quartz_core::{CALayer, CATransaction};

use super::overlay::{BorderStyle, Canvas, Color, Drawable, SurfaceError};
use crate::model::Rect;
use crate::sys::cgs_window::{CgsWindow, CgsWindowError};

impl Color {
    pub fn to_nscolor(self) -> Retained<NSColor> {
        NSColor::colorWithRed_green_blue_alpha(self.r, self.g, self.b, self.a)
    }
}

impl From<CgsWindowError> for SurfaceError {
    fn from(err: CgsWindowError) -> Self { SurfaceError::Update(err.to_string()) }
}

fn local_frame(size: CGSize) -> CGRect { CGRect::new(CGPoint::new(0.0, 0.0), size) }

pub(crate) fn with_transaction(f: impl FnOnce()) {
    CATransaction::begin();
    CATransaction::setDisableActions(true);
    f();
    CATransaction::commit();
}

pub struct CgsCanvas {
    frame: CGRect,
    root_layer: Retained<CALayer>,
    border_layer: Retained<CALayer>,
    cgs_window: CgsWindow,
}

impl CgsCanvas {
    pub fn new() -> Result<Self, SurfaceError> {
        let frame = CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(100.0, 100.0));

        let root_layer = CALayer::layer();
        root_layer.setFrame(local_frame(frame.size));
        let border_layer = CALayer::layer();
        border_layer.setFrame(local_frame(frame.size));
        border_layer.setBackgroundColor(None);
        root_layer.addSublayer(&border_layer);

        let cgs_window =
            CgsWindow::new(frame.size).map_err(|e| SurfaceError::Construction(e.to_string()))?;

        Ok(Self { frame, root_layer, border_layer, cgs_window })
    }
}

impl Canvas for CgsCanvas {
    type Layer = Retained<CALayer>;

    fn set_frame(&mut self, native: Rect) -> Result<(), SurfaceError> {
        let frame = CGRect::from(native);
        self.cgs_window.set_frame(frame)?;
        self.frame = frame;
        with_transaction(|| self.root_layer.setFrame(local_frame(frame.size)));
        Ok(())
    }

    fn apply_border(&mut self, style: &BorderStyle) {
        let size = self.frame.size;
        with_transaction(|| {
            self.border_layer.setFrame(local_frame(size));
            self.border_layer.setBorderColor(Some(&style.color.to_nscolor().CGColor()));
            self.border_layer.setBorderWidth(style.width);
        });
    }

    fn add_layer(&mut self, drawable: &Drawable) -> Retained<CALayer> {
        let layer = CALayer::layer();
        with_transaction(|| {
            match *drawable {
                Drawable::Fill { rect, color } => {
                    layer.setFrame(rect.into());
                    layer.setBackgroundColor(Some(&color.to_nscolor().CGColor()));
                }
                Drawable::Stroke { rect, width, color } => {
                    layer.setFrame(rect.into());
                    layer.setBackgroundColor(None);
                    layer.setBorderColor(Some(&color.to_nscolor().CGColor()));
                    layer.setBorderWidth(width);
                }
            }
            self.root_layer.addSublayer(&layer);
        });
        layer
    }

    fn remove_layer(&mut self, layer: Retained<CALayer>) {
        with_transaction(|| layer.removeFromSuperlayer());
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.cgs_window.render(&self.root_layer, self.frame.size)?;
        Ok(())
    }

    fn order_front(&mut self) -> Result<(), SurfaceError> {
        self.cgs_window.order_front(NSPopUpMenuWindowLevel as i32)?;
        Ok(())
    }

    fn order_out(&mut self) -> Result<(), SurfaceError> {
        self.cgs_window.order_out()?;
        Ok(())
    }
}
