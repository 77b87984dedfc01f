#[cfg(target_os = "macos")]
pub mod cgs_canvas;
pub mod overlay;
pub mod shell;
#[cfg(target_os = "macos")]
pub mod side_panel;
