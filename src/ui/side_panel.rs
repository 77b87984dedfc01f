//! Narrow, tall panel placed to the right of the overlay: a red frame, a
//! dark inner area and a column of labelled buttons. The first button carries
//! the action label; the rest are placeholders.

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_app_kit::NSPopUpMenuWindowLevel;
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_foundation::NSString;
use objc2_quartz_core::{CALayer, CATextLayer, kCAAlignmentCenter};
use tracing::{debug, warn};

use super::cgs_canvas::with_transaction;
use super::overlay::{Color, SurfaceError};
use super::shell::{PanelView, button_labels};
use crate::common::config::{MAX_PANEL_WIDTH, PanelSettings};
use crate::layout_engine::{PANEL_BUTTON_HEIGHT, panel_button_slots, pixels};
use crate::model::Rect;
use crate::sys::cgs_window::{CgsWindow, CgsWindowError};

const INNER_COLOR: Color = Color::rgba(0.114, 0.114, 0.122, 1.0);
const BUTTON_COLOR: Color = Color::rgba(0.22, 0.22, 0.24, 1.0);
const LABEL_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
const LABEL_FONT_SIZE: f64 = 13.0;

pub struct SidePanel {
    frame: CGRect,
    root_layer: Retained<CALayer>,
    cgs_window: CgsWindow,
    width: i32,
    border_width: f64,
    border_color: Color,
    labels: Vec<String>,
    visible: bool,
}

impl SidePanel {
    pub fn new(
        settings: &PanelSettings,
        border_width: f64,
        border_color: Color,
    ) -> Result<Self, CgsWindowError> {
        let width = pixels(settings.width, MAX_PANEL_WIDTH);
        let frame = CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(width as f64, 100.0));
        let root_layer = CALayer::layer();
        root_layer.setFrame(CGRect::new(CGPoint::new(0.0, 0.0), frame.size));

        let cgs_window = CgsWindow::new(frame.size)?;

        Ok(Self {
            frame,
            root_layer,
            cgs_window,
            width,
            border_width,
            border_color,
            labels: button_labels(&settings.action_label, settings.button_count),
            visible: false,
        })
    }

    fn place(&mut self, frame: CGRect) -> Result<(), CgsWindowError> {
        self.cgs_window.set_frame(frame)?;
        self.frame = frame;
        self.rebuild_layers();
        self.cgs_window.render(&self.root_layer, frame.size)?;
        self.cgs_window.order_front(NSPopUpMenuWindowLevel as i32)
    }

    fn rebuild_layers(&self) {
        let size = self.frame.size;
        let inset = self.border_width.ceil() as i32 + 1;

        with_transaction(|| {
            self.root_layer.setFrame(CGRect::new(CGPoint::new(0.0, 0.0), size));
            unsafe { self.root_layer.setSublayers(None) };

            let frame_layer = CALayer::layer();
            frame_layer.setFrame(CGRect::new(CGPoint::new(0.0, 0.0), size));
            frame_layer.setBackgroundColor(Some(&INNER_COLOR.to_nscolor().CGColor()));
            frame_layer.setBorderColor(Some(&self.border_color.to_nscolor().CGColor()));
            frame_layer.setBorderWidth(self.border_width);
            self.root_layer.addSublayer(&frame_layer);

            let slots =
                panel_button_slots(self.width, size.height as i32, inset, self.labels.len());
            for (slot, label) in slots.iter().zip(&self.labels) {
                self.root_layer.addSublayer(&button_layer(*slot, label));
            }
        });
    }
}

fn button_layer(slot: Rect, label: &str) -> Retained<CALayer> {
    let button = CALayer::layer();
    button.setFrame(slot.into());
    button.setBackgroundColor(Some(&BUTTON_COLOR.to_nscolor().CGColor()));
    button.setCornerRadius(4.0);

    let text = CATextLayer::layer();
    let text_height = LABEL_FONT_SIZE + 4.0;
    text.setFrame(CGRect::new(
        CGPoint::new(0.0, (PANEL_BUTTON_HEIGHT as f64 - text_height) / 2.0),
        CGSize::new(slot.width as f64, text_height),
    ));
    let string = NSString::from_str(label);
    let string: &AnyObject = &string;
    unsafe {
        text.setString(Some(string));
        text.setAlignmentMode(kCAAlignmentCenter);
    }
    text.setFontSize(LABEL_FONT_SIZE);
    text.setForegroundColor(Some(&LABEL_COLOR.to_nscolor().CGColor()));
    text.setContentsScale(2.0);
    button.addSublayer(&text);
    button
}

impl PanelView for SidePanel {
    fn show_at(&mut self, x: i32, y: i32, height: i32) -> Result<(), SurfaceError> {
        let frame = CGRect::new(
            CGPoint::new(x as f64, y as f64),
            CGSize::new(self.width as f64, height as f64),
        );
        self.place(frame)?;
        if !self.visible {
            debug!(x, y, height, "side panel shown");
        }
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        if let Err(err) = self.cgs_window.order_out() {
            warn!(error=?err, "failed to order side panel out");
        }
    }
}
