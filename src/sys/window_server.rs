use std::ptr::NonNull;

use objc2_core_foundation::{CFArray, CFDictionary, CFNumber, CFRetained, CFString, CFType, CGRect};
use objc2_core_graphics::{
    CGImage, CGWindowListCopyWindowInfo, CGWindowListOption, kCGNullWindowID, kCGWindowBounds,
    kCGWindowNumber, kCGWindowOwnerName,
};
use tracing::debug;

use super::geometry::ToRect;
use super::skylight::{
    CAPTURE_OPTIONS, CGRectMakeWithDictionaryRepresentation, G_CONNECTION, SLSHWCaptureWindowList,
};
use crate::locator::{FrameInfo, NativeWindowId, QueryError, WindowEntry, WindowSource};

/// Reads the on-screen window list from the window server.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowServer;

impl WindowSource for WindowServer {
    fn on_screen_windows(&self) -> Result<Vec<WindowEntry>, QueryError> {
        let windows = copy_on_screen_window_info().ok_or(QueryError::WindowListUnavailable)?;
        Ok(windows.iter().filter_map(|win| make_entry(&win)).collect())
    }

    fn capture_frame(&self, id: NativeWindowId) -> Option<FrameInfo> {
        let image = capture_window(id)?;
        let frame = FrameInfo {
            width: CGImage::width(Some(&*image)) as u32,
            height: CGImage::height(Some(&*image)) as u32,
        };
        (frame.width > 0 && frame.height > 0).then_some(frame)
    }
}

fn copy_on_screen_window_info() -> Option<CFRetained<CFArray<CFDictionary<CFString, CFType>>>> {
    // None here almost always means the process lacks Screen Recording access.
    let windows =
        unsafe { CGWindowListCopyWindowInfo(CGWindowListOption::OptionOnScreenOnly, kCGNullWindowID) }?;
    Some(unsafe { CFRetained::cast_unchecked(windows) })
}

fn make_entry(win: &CFDictionary<CFString, CFType>) -> Option<WindowEntry> {
    let id = get_num(win, unsafe { kCGWindowNumber })?;
    let owner = win
        .get(unsafe { kCGWindowOwnerName })
        .and_then(|name| name.downcast::<CFString>().ok())
        .map(|name| name.to_string());
    let dict = win.get(unsafe { kCGWindowBounds })?.downcast::<CFDictionary>().ok()?;
    let mut cg_frame = CGRect::default();
    let ok = unsafe {
        CGRectMakeWithDictionaryRepresentation(
            CFRetained::<CFDictionary<_, _>>::as_ptr(&dict).as_ptr(),
            &mut cg_frame,
        )
    };
    if !ok {
        debug!(id, "window bounds could not be decoded");
        return None;
    }
    Some(WindowEntry {
        id: NativeWindowId(id.try_into().ok()?),
        owner,
        bounds: cg_frame.to_rect(),
    })
}

fn get_num(dict: &CFDictionary<CFString, CFType>, key: &'static CFString) -> Option<i64> {
    dict.get(key)?.downcast::<CFNumber>().ok()?.as_i64()
}

fn capture_window(id: NativeWindowId) -> Option<CFRetained<CGImage>> {
    unsafe {
        let imgs_ref = SLSHWCaptureWindowList(*G_CONNECTION, &id.0 as *const u32, 1, CAPTURE_OPTIONS);
        let imgs = CFRetained::from_raw(NonNull::new(imgs_ref)?);
        imgs.get(0)
    }
}
