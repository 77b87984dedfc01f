//! Finds the target application's window among everything on screen.

use std::fmt;

use tracing::{debug, trace};

use crate::model::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeWindowId(pub u32);

impl fmt::Display for NativeWindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// One row of the OS window list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub id: NativeWindowId,
    pub owner: Option<String>,
    pub bounds: Rect,
}

/// The window picked for this tick. Never mutated; a fresh one is produced
/// on every lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    pub id: NativeWindowId,
    pub owner: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(WindowHandle),
    NotFound,
}

/// Size of a captured still of the target window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("window list unavailable (check Screen Recording permission)")]
    WindowListUnavailable,
}

/// Source of on-screen window information.
pub trait WindowSource {
    /// All on-screen windows in the order the OS reports them.
    fn on_screen_windows(&self) -> Result<Vec<WindowEntry>, QueryError>;

    /// Captures a still of `id`. `None` means the capture failed.
    fn capture_frame(&self, _id: NativeWindowId) -> Option<FrameInfo> { None }
}

impl<S: WindowSource + ?Sized> WindowSource for &S {
    fn on_screen_windows(&self) -> Result<Vec<WindowEntry>, QueryError> {
        (**self).on_screen_windows()
    }

    fn capture_frame(&self, id: NativeWindowId) -> Option<FrameInfo> { (**self).capture_frame(id) }
}

pub struct WindowLocator<S> {
    source: S,
}

impl<S: WindowSource> WindowLocator<S> {
    pub fn new(source: S) -> Self { Self { source } }

    pub fn locate(&self, owner_substring: &str) -> Result<Lookup, QueryError> {
        let windows = self.source.on_screen_windows()?;
        trace!(count = windows.len(), "enumerated on-screen windows");
        let found = select_best(&windows, owner_substring);
        match &found {
            Lookup::Found(handle) => {
                debug!(id = %handle.id, owner = %handle.owner, bounds = %handle.bounds, "target located")
            }
            Lookup::NotFound => debug!(owner_substring, "no matching window"),
        }
        Ok(found)
    }

    pub fn capture(&self, handle: &WindowHandle) -> Option<FrameInfo> {
        self.source.capture_frame(handle.id)
    }
}

/// Picks the largest-area window whose owner name contains `needle`,
/// ignoring case. Ties keep the earliest window in `windows`.
pub fn select_best(windows: &[WindowEntry], needle: &str) -> Lookup {
    let needle = needle.to_lowercase();
    let mut best: Option<&WindowEntry> = None;
    for entry in windows {
        let Some(owner) = entry.owner.as_deref().map(str::trim) else { continue };
        if owner.is_empty() || !owner.to_lowercase().contains(&needle) {
            continue;
        }
        if entry.bounds.is_empty() {
            continue;
        }
        if best.is_none_or(|b| entry.bounds.area() > b.bounds.area()) {
            best = Some(entry);
        }
    }
    match best {
        Some(entry) => Lookup::Found(WindowHandle {
            id: entry.id,
            owner: entry.owner.as_deref().unwrap_or_default().trim().to_string(),
            bounds: entry.bounds,
        }),
        None => Lookup::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: u32, owner: Option<&str>, bounds: Rect) -> WindowEntry {
        WindowEntry { id: NativeWindowId(id), owner: owner.map(String::from), bounds }
    }

    fn found_id(lookup: &Lookup) -> Option<u32> {
        match lookup {
            Lookup::Found(h) => Some(h.id.0),
            Lookup::NotFound => None,
        }
    }

    struct Stub {
        windows: Result<Vec<WindowEntry>, QueryError>,
        calls: Cell<usize>,
    }

    impl WindowSource for Stub {
        fn on_screen_windows(&self) -> Result<Vec<WindowEntry>, QueryError> {
            self.calls.set(self.calls.get() + 1);
            self.windows.clone()
        }
    }

    #[test]
    fn matches_case_insensitive_substring() {
        let windows = vec![
            entry(1, Some("Finder"), Rect::new(0, 0, 500, 500)),
            entry(2, Some("SurfTank Pro"), Rect::new(10, 20, 300, 200)),
        ];
        let lookup = select_best(&windows, "surftank");
        assert_eq!(
            lookup,
            Lookup::Found(WindowHandle {
                id: NativeWindowId(2),
                owner: "SurfTank Pro".into(),
                bounds: Rect::new(10, 20, 300, 200),
            })
        );
    }

    #[test]
    fn largest_area_wins() {
        let windows = vec![
            entry(1, Some("SurfTank"), Rect::new(0, 0, 100, 100)),
            entry(2, Some("SurfTank"), Rect::new(0, 0, 800, 600)),
            entry(3, Some("SurfTank"), Rect::new(0, 0, 400, 300)),
        ];
        assert_eq!(found_id(&select_best(&windows, "SurfTank")), Some(2));
    }

    #[test]
    fn ties_go_to_first_enumerated() {
        let windows = vec![
            entry(7, Some("SurfTank"), Rect::new(0, 0, 200, 100)),
            entry(3, Some("SurfTank"), Rect::new(50, 50, 100, 200)),
        ];
        for _ in 0..3 {
            assert_eq!(found_id(&select_best(&windows, "SurfTank")), Some(7));
        }
    }

    #[test]
    fn skips_empty_owner_and_zero_size() {
        let windows = vec![
            entry(1, None, Rect::new(0, 0, 900, 900)),
            entry(2, Some("   "), Rect::new(0, 0, 900, 900)),
            entry(3, Some("SurfTank"), Rect::new(0, 0, 0, 900)),
            entry(4, Some("SurfTank"), Rect::new(0, 0, 900, 0)),
        ];
        assert_eq!(select_best(&windows, "SurfTank"), Lookup::NotFound);
        assert_eq!(select_best(&windows, ""), Lookup::NotFound);
    }

    #[test]
    fn owner_is_trimmed_before_matching() {
        let windows = vec![entry(5, Some("  SurfTank  "), Rect::new(1, 2, 3, 4))];
        let Lookup::Found(handle) = select_best(&windows, "surftank") else {
            panic!("expected a match");
        };
        assert_eq!(handle.owner, "SurfTank");
    }

    #[test]
    fn locate_propagates_query_errors() {
        let stub = Stub { windows: Err(QueryError::WindowListUnavailable), calls: Cell::new(0) };
        let locator = WindowLocator::new(&stub);
        assert_eq!(locator.locate("SurfTank"), Err(QueryError::WindowListUnavailable));
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn locate_reports_not_found() {
        let stub = Stub { windows: Ok(vec![]), calls: Cell::new(0) };
        let locator = WindowLocator::new(&stub);
        assert_eq!(locator.locate("SurfTank"), Ok(Lookup::NotFound));
        assert_eq!(locator.capture(&WindowHandle {
            id: NativeWindowId(1),
            owner: "x".into(),
            bounds: Rect::new(0, 0, 1, 1),
        }), None);
    }
}
