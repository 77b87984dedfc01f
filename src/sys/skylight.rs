// credits
// https://github.com/asmagill/hs._asm.undocumented.spaces/blob/master/CGSSpace.h.
// https://github.com/koekeishiya/yabai/blob/d55a647913ab72d8d8b348bee2d3e59e52ce4a5d/src/misc/extern.h.

use std::ffi::{c_int, c_void};

use objc2_core_foundation::{CFArray, CFDictionary, CFType, CGRect};
use objc2_core_graphics::{CGContext, CGError, CGImage};
use once_cell::sync::Lazy;

pub static G_CONNECTION: Lazy<cid_t> = Lazy::new(|| unsafe { SLSMainConnectionID() });

#[allow(non_camel_case_types)]
pub type cid_t = i32;

/// Capture options for `SLSHWCaptureWindowList`: ignore global clip shape,
/// best resolution, full size.
pub const CAPTURE_OPTIONS: u32 = (1 << 11) | (1 << 9) | (1 << 19);

unsafe extern "C" {
    #[allow(clashing_extern_declarations)]
    pub fn CFRelease(cf: *mut CFType);
    pub fn CGRectMakeWithDictionaryRepresentation(
        dict: *mut CFDictionary,
        rect: *mut CGRect,
    ) -> bool;

    pub fn SLSMainConnectionID() -> cid_t;

    pub fn SLSHWCaptureWindowList(
        cid: cid_t,
        window_list: *const u32,
        window_count: c_int,
        options: u32,
    ) -> *mut CFArray<CGImage>;

    pub fn SLSNewWindowWithOpaqueShapeAndContext(
        cid: cid_t,
        r#type: c_int,
        region: *mut CFType,
        opaque_region: *mut CFType,
        options: c_int,
        tags: *mut u64,
        x: f32,
        y: f32,
        tag_count: c_int,
        out_wid: *mut u32,
        context: *mut c_void,
    ) -> CGError;
    pub fn SLSReleaseWindow(cid: cid_t, wid: u32) -> CGError;
    pub fn SLSSetWindowResolution(cid: cid_t, wid: u32, resolution: f64) -> CGError;
    pub fn SLSSetWindowAlpha(cid: cid_t, wid: u32, alpha: f32) -> CGError;
    pub fn SLSSetWindowLevel(cid: cid_t, wid: u32, level: c_int) -> CGError;
    pub fn SLSSetWindowSubLevel(cid: cid_t, wid: u32, sub_level: c_int) -> CGError;
    pub fn SLSSetWindowOpacity(cid: cid_t, wid: u32, opaque: bool) -> CGError;
    pub fn SLSSetWindowShape(
        cid: cid_t,
        wid: u32,
        x_offset: f32,
        y_offset: f32,
        shape: *mut CFType,
    ) -> CGError;
    pub fn SLSOrderWindow(cid: cid_t, wid: u32, order: c_int, relative_to: u32) -> CGError;
    pub fn CGSNewRegionWithRect(rect: *const CGRect, region: *mut *mut CFType) -> CGError;
    pub fn CGRegionCreateEmptyRegion() -> *mut CFType;
    pub fn SLWindowContextCreate(cid: cid_t, wid: u32, options: *mut CFType) -> *mut CGContext;
    pub fn SLSFlushWindowContentRegion(cid: cid_t, wid: u32, dirty: *mut c_void) -> CGError;
}
