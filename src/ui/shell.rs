//! Outbound side of the user interface: the status line and the side panel.

use std::io::Write;

use crossterm::queue;
use crossterm::style::{self, Print, ResetColor, SetForegroundColor};
use tracing::warn;

use super::overlay::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
    Blue,
    Orange,
}

impl StatusColor {
    fn terminal_color(self) -> style::Color {
        match self {
            StatusColor::Green => style::Color::Green,
            StatusColor::Red => style::Color::Red,
            StatusColor::Blue => style::Color::Blue,
            StatusColor::Orange => style::Color::Rgb { r: 255, g: 165, b: 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub color: StatusColor,
}

impl Status {
    pub fn new(text: impl Into<String>, color: StatusColor) -> Self {
        Self { text: text.into(), color }
    }
}

pub trait UiShell {
    fn set_status(&mut self, status: &Status);
    fn show_panel_at(&mut self, x: i32, y: i32, height: i32);
    fn hide_panel(&mut self);
}

/// A window holding the button column, placed beside the overlay.
pub trait PanelView {
    fn show_at(&mut self, x: i32, y: i32, height: i32) -> Result<(), SurfaceError>;
    fn hide(&mut self);
}

/// Labels of the panel's button column; only the first one is wired.
pub fn button_labels(action_label: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| if i == 0 { action_label.to_string() } else { format!("Button {}", i + 1) })
        .collect()
}

/// Prints status changes as colored lines and forwards panel placement to an
/// optional [`PanelView`].
pub struct ConsoleShell<W: Write> {
    out: W,
    last: Option<Status>,
    panel: Option<Box<dyn PanelView>>,
    panel_at: Option<(i32, i32, i32)>,
}

impl<W: Write> ConsoleShell<W> {
    pub fn new(out: W, panel: Option<Box<dyn PanelView>>) -> Self {
        Self { out, last: None, panel, panel_at: None }
    }

    #[cfg(test)]
    fn last_status(&self) -> Option<&Status> { self.last.as_ref() }

    #[cfg(test)]
    fn into_inner(self) -> W { self.out }

    fn write_status(&mut self, status: &Status) -> std::io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(status.color.terminal_color()),
            Print(&status.text),
            ResetColor,
            Print("\n")
        )?;
        self.out.flush()
    }
}

impl<W: Write> UiShell for ConsoleShell<W> {
    fn set_status(&mut self, status: &Status) {
        if self.last.as_ref() == Some(status) {
            return;
        }
        if let Err(err) = self.write_status(status) {
            warn!(?err, "failed to write status line");
        }
        self.last = Some(status.clone());
    }

    fn show_panel_at(&mut self, x: i32, y: i32, height: i32) {
        if self.panel_at == Some((x, y, height)) {
            return;
        }
        if let Some(panel) = self.panel.as_mut()
            && let Err(err) = panel.show_at(x, y, height)
        {
            // Left unrecorded so the next tick tries again.
            warn!(error = %err, "failed to place side panel");
            return;
        }
        self.panel_at = Some((x, y, height));
    }

    fn hide_panel(&mut self) {
        if self.panel_at.take().is_none() {
            return;
        }
        if let Some(panel) = self.panel.as_mut() {
            panel.hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct Panel(Rc<RefCell<Vec<String>>>);

    impl PanelView for Panel {
        fn show_at(&mut self, x: i32, y: i32, height: i32) -> Result<(), SurfaceError> {
            self.0.borrow_mut().push(format!("show {x},{y} h={height}"));
            Ok(())
        }

        fn hide(&mut self) { self.0.borrow_mut().push("hide".into()); }
    }

    #[test]
    fn prints_only_on_change() {
        let mut shell = ConsoleShell::new(Vec::new(), None);
        let found = Status::new("SurfTank connected", StatusColor::Green);
        shell.set_status(&found);
        shell.set_status(&found);
        shell.set_status(&Status::new("SurfTank not found", StatusColor::Red));
        assert_eq!(shell.last_status().map(|s| s.color), Some(StatusColor::Red));
        let text = String::from_utf8(shell.into_inner()).unwrap();
        assert_eq!(text.matches("SurfTank connected").count(), 1);
        assert_eq!(text.matches("SurfTank not found").count(), 1);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn same_text_with_new_color_is_reprinted() {
        let mut shell = ConsoleShell::new(Vec::new(), None);
        shell.set_status(&Status::new("x", StatusColor::Blue));
        shell.set_status(&Status::new("x", StatusColor::Orange));
        let text = String::from_utf8(shell.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn panel_moves_only_when_placement_changes() {
        let panel = Panel::default();
        let mut shell = ConsoleShell::new(Vec::new(), Some(Box::new(panel.clone())));
        shell.show_panel_at(916, 50, 608);
        shell.show_panel_at(916, 50, 608);
        shell.hide_panel();
        shell.hide_panel();
        shell.show_panel_at(916, 60, 608);
        assert_eq!(
            *panel.0.borrow(),
            vec!["show 916,50 h=608".to_string(), "hide".into(), "show 916,60 h=608".into()]
        );
    }

    /// Fails the first `failures` placements, then succeeds.
    #[derive(Clone, Default)]
    struct FlakyPanel {
        failures: Rc<RefCell<usize>>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl PanelView for FlakyPanel {
        fn show_at(&mut self, x: i32, y: i32, height: i32) -> Result<(), SurfaceError> {
            let mut failures = self.failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                self.calls.borrow_mut().push("failed".into());
                return Err(SurfaceError::Update("window shape rejected".into()));
            }
            self.calls.borrow_mut().push(format!("show {x},{y} h={height}"));
            Ok(())
        }

        fn hide(&mut self) { self.calls.borrow_mut().push("hide".into()); }
    }

    #[test]
    fn failed_panel_placement_is_retried() {
        let panel = FlakyPanel::default();
        *panel.failures.borrow_mut() = 1;
        let mut shell = ConsoleShell::new(Vec::new(), Some(Box::new(panel.clone())));
        shell.show_panel_at(916, 50, 608);
        shell.show_panel_at(916, 50, 608);
        shell.show_panel_at(916, 50, 608);
        assert_eq!(
            *panel.calls.borrow(),
            vec!["failed".to_string(), "show 916,50 h=608".into()]
        );
    }

    #[test]
    fn hide_after_failed_placement_is_skipped() {
        let panel = FlakyPanel::default();
        *panel.failures.borrow_mut() = 1;
        let mut shell = ConsoleShell::new(Vec::new(), Some(Box::new(panel.clone())));
        shell.show_panel_at(916, 50, 608);
        shell.hide_panel();
        assert_eq!(*panel.calls.borrow(), vec!["failed".to_string()]);
    }

    #[test]
    fn first_button_carries_the_action_label() {
        assert_eq!(
            button_labels("ARENA", 3),
            vec!["ARENA".to_string(), "Button 2".into(), "Button 3".into()]
        );
        assert!(button_labels("ARENA", 0).is_empty());
    }

    #[test]
    fn status_color_names() {
        assert_eq!(StatusColor::Orange.to_string(), "orange");
    }
}
