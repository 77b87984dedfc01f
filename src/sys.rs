#[cfg(target_os = "macos")]
pub mod cgs_window;
#[cfg(target_os = "macos")]
pub mod geometry;
pub mod screen;
#[cfg(target_os = "macos")]
pub mod skylight;
#[cfg(target_os = "macos")]
pub mod window_server;

#[cfg(target_os = "macos")]
use objc2_core_graphics::CGError;

#[cfg(target_os = "macos")]
#[inline]
pub(crate) fn cg_ok(err: CGError) -> Result<(), CGError> {
    if err == CGError::Success { Ok(()) } else { Err(err) }
}
