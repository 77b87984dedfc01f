//! A click-through SkyLight window that displays a CALayer tree.

use std::ptr::{self, NonNull};

use objc2_core_foundation::{CFRetained, CFType, CGPoint, CGRect, CGSize};
use objc2_core_graphics::{CGContext, CGError};
use objc2_quartz_core::CALayer;

use super::skylight::{
    CFRelease, CGRegionCreateEmptyRegion, CGSNewRegionWithRect, G_CONNECTION,
    SLSFlushWindowContentRegion, SLSNewWindowWithOpaqueShapeAndContext, SLSOrderWindow,
    SLSReleaseWindow, SLSSetWindowAlpha, SLSSetWindowLevel, SLSSetWindowOpacity,
    SLSSetWindowResolution, SLSSetWindowShape, SLSSetWindowSubLevel, SLWindowContextCreate, cid_t,
};
use crate::sys::cg_ok;

unsafe extern "C" {
    fn CGContextFlush(ctx: *mut CGContext);
    fn CGContextClearRect(ctx: *mut CGContext, rect: CGRect);
    fn CGContextSaveGState(ctx: *mut CGContext);
    fn CGContextRestoreGState(ctx: *mut CGContext);
    fn CGContextTranslateCTM(ctx: *mut CGContext, tx: f64, ty: f64);
    fn CGContextScaleCTM(ctx: *mut CGContext, sx: f64, sy: f64);
}

const BACKING_TYPE_BUFFERED: i32 = 2;
const CREATE_OPTIONS: i32 = 13;
const TAG_BITS: i32 = 64;
// Floating, and never activates or takes mouse events.
const CLICK_THROUGH_TAGS: u64 = (1 << 1) | (1 << 9);
const ORDER_OUT: i32 = 0;
const ORDER_ABOVE: i32 = 1;
const RETINA_SCALE: f64 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum CgsWindowError {
    #[error("could not build window region: {0:?}")]
    Region(CGError),
    #[error("could not create window: {0:?}")]
    Create(CGError),
    #[error("could not configure window: {0:?}")]
    Configure(CGError),
    #[error("could not reshape window: {0:?}")]
    Shape(CGError),
    #[error("could not order window: {0:?}")]
    Order(CGError),
    #[error("window has no drawing context")]
    NoContext,
}

/// Owned CoreGraphics region.
struct Region(CFRetained<CFType>);

impl Region {
    fn covering(size: CGSize) -> Result<Self, CgsWindowError> {
        let rect = CGRect::new(CGPoint::new(0.0, 0.0), size);
        let mut raw: *mut CFType = ptr::null_mut();
        cg_ok(unsafe { CGSNewRegionWithRect(&rect, &mut raw) }).map_err(CgsWindowError::Region)?;
        Self::adopt(raw)
    }

    fn empty() -> Result<Self, CgsWindowError> { Self::adopt(unsafe { CGRegionCreateEmptyRegion() }) }

    fn adopt(raw: *mut CFType) -> Result<Self, CgsWindowError> {
        let raw = NonNull::new(raw).ok_or(CgsWindowError::Region(CGError::Failure))?;
        Ok(Self(unsafe { CFRetained::from_raw(raw) }))
    }

    fn as_ptr(&self) -> *mut CFType { CFRetained::<CFType>::as_ptr(&self.0).as_ptr() }
}

/// Transparent, borderless window. Released on drop.
#[derive(Debug)]
pub struct CgsWindow {
    id: u32,
    cid: cid_t,
}

impl CgsWindow {
    /// Creates the window hidden, sized to `size`.
    pub fn new(size: CGSize) -> Result<Self, CgsWindowError> {
        let cid = *G_CONNECTION;
        let shape = Region::covering(size)?;
        let opaque = Region::empty()?;
        let mut tags = CLICK_THROUGH_TAGS;
        let mut id = 0;
        cg_ok(unsafe {
            SLSNewWindowWithOpaqueShapeAndContext(
                cid,
                BACKING_TYPE_BUFFERED,
                shape.as_ptr(),
                opaque.as_ptr(),
                CREATE_OPTIONS,
                &mut tags,
                0.0,
                0.0,
                TAG_BITS,
                &mut id,
                ptr::null_mut(),
            )
        })
        .map_err(CgsWindowError::Create)?;

        let window = Self { id, cid };
        unsafe {
            cg_ok(SLSSetWindowResolution(cid, id, RETINA_SCALE))
                .and_then(|()| cg_ok(SLSSetWindowOpacity(cid, id, false)))
                .and_then(|()| cg_ok(SLSSetWindowAlpha(cid, id, 1.0)))
        }
        .map_err(CgsWindowError::Configure)?;
        Ok(window)
    }

    /// Moves the window to `frame.origin` (global, top-left) and resizes it.
    pub fn set_frame(&self, frame: CGRect) -> Result<(), CgsWindowError> {
        let shape = Region::covering(frame.size)?;
        cg_ok(unsafe {
            SLSSetWindowShape(
                self.cid,
                self.id,
                frame.origin.x as f32,
                frame.origin.y as f32,
                shape.as_ptr(),
            )
        })
        .map_err(CgsWindowError::Shape)
    }

    /// Raises the window to `level` and orders it above everything there.
    pub fn order_front(&self, level: i32) -> Result<(), CgsWindowError> {
        unsafe {
            cg_ok(SLSSetWindowLevel(self.cid, self.id, level))
                .and_then(|()| cg_ok(SLSSetWindowSubLevel(self.cid, self.id, 0)))
                .and_then(|()| cg_ok(SLSOrderWindow(self.cid, self.id, ORDER_ABOVE, 0)))
        }
        .map_err(CgsWindowError::Order)
    }

    pub fn order_out(&self) -> Result<(), CgsWindowError> {
        cg_ok(unsafe { SLSOrderWindow(self.cid, self.id, ORDER_OUT, 0) })
            .map_err(CgsWindowError::Order)
    }

    /// Draws `root` into the window's backing store and flushes it. Layer
    /// geometry is top-left, Y-down; the context is flipped to match.
    pub fn render(&self, root: &CALayer, size: CGSize) -> Result<(), CgsWindowError> {
        let ctx = unsafe { SLWindowContextCreate(self.cid, self.id, ptr::null_mut()) };
        if ctx.is_null() {
            return Err(CgsWindowError::NoContext);
        }
        unsafe {
            CGContextClearRect(ctx, CGRect::new(CGPoint::new(0.0, 0.0), size));
            CGContextSaveGState(ctx);
            CGContextTranslateCTM(ctx, 0.0, size.height);
            CGContextScaleCTM(ctx, 1.0, -1.0);
            root.renderInContext(&*ctx);
            CGContextRestoreGState(ctx);
            CGContextFlush(ctx);
            SLSFlushWindowContentRegion(self.cid, self.id, ptr::null_mut());
            CFRelease(ctx as *mut CFType);
        }
        Ok(())
    }
}

impl Drop for CgsWindow {
    fn drop(&mut self) {
        if let Err(err) = cg_ok(unsafe { SLSReleaseWindow(self.cid, self.id) }) {
            tracing::warn!(error = ?err, id = self.id, "failed to release window");
        }
    }
}
