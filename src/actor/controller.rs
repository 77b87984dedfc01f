//! The poll loop. Owns the timer, the overlay and the toggle flags, and
//! contains every per-tick failure.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::actor;
use crate::common::config::{Config, MIN_POLL_INTERVAL_MS};
use crate::layout_engine::{LayoutParams, resolve};
use crate::locator::{Lookup, QueryError, WindowHandle, WindowLocator, WindowSource};
use crate::ui::overlay::{Canvas, OverlaySurface, SurfaceError};
use crate::ui::shell::{Status, StatusColor, UiShell};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    GridToggled(bool),
    AnnotationToggled(bool),
    ActionPressed,
    Shutdown,
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Absent,
    Present,
}

#[derive(Debug, thiserror::Error)]
enum TickError {
    #[error("target window not found")]
    NotFound,
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("frame capture failed")]
    CaptureFailed,
}

pub struct Controller<S: WindowSource, C: Canvas, U: UiShell> {
    rx: Receiver,
    locator: WindowLocator<S>,
    surface: OverlaySurface<C>,
    shell: U,
    target: String,
    poll_interval: Duration,
    heartbeat: bool,
    action_label: String,
    params: LayoutParams,
    grid_enabled: bool,
    annotation_enabled: bool,
    state: TargetState,
}

impl<S: WindowSource, C: Canvas, U: UiShell> Controller<S, C, U> {
    pub fn new(
        config: &Config,
        rx: Receiver,
        locator: WindowLocator<S>,
        surface: OverlaySurface<C>,
        shell: U,
    ) -> Self {
        Self {
            rx,
            locator,
            surface,
            shell,
            target: config.target.owner.clone(),
            poll_interval: Duration::from_millis(
                config.target.poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            ),
            heartbeat: config.target.heartbeat_capture,
            action_label: config.panel.action_label.clone(),
            params: LayoutParams::from(config),
            grid_enabled: false,
            annotation_enabled: false,
            state: TargetState::Absent,
        }
    }

    pub fn state(&self) -> TargetState { self.state }

    /// Ticks immediately, then every poll interval, handling UI events in
    /// between. Returns on [`Event::Shutdown`] or when every sender is gone.
    pub async fn run(mut self) {
        info!(owner = %self.target, interval = ?self.poll_interval, "watching for target window");
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                maybe = self.rx.recv() => {
                    let Some((span, event)) = maybe else { break };
                    let _enter = span.enter();
                    if self.handle_event(event).is_break() {
                        break;
                    }
                }
                _ = interval.tick() => self.tick(),
            }
        }

        self.shutdown();
    }

    #[instrument(name = "controller::handle_event", skip(self))]
    fn handle_event(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::GridToggled(enabled) => {
                self.grid_enabled = enabled;
                self.acknowledge(format!("Grid {}", on_off(enabled)));
            }
            Event::AnnotationToggled(enabled) => {
                self.annotation_enabled = enabled;
                self.acknowledge(format!("Minimap annotation {}", on_off(enabled)));
            }
            Event::ActionPressed => {
                info!(label = %self.action_label, "action button pressed");
                self.acknowledge(format!("{} pressed", self.action_label));
            }
            Event::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    #[instrument(name = "controller::tick", skip(self))]
    fn tick(&mut self) {
        match self.sync_overlay() {
            Ok(handle) => {
                if self.state == TargetState::Absent {
                    info!(owner = %handle.owner, bounds = %handle.bounds, "target present");
                }
                self.state = TargetState::Present;
                self.shell.set_status(&connected_status(&self.target, &handle));
            }
            Err(err) => self.enter_absent(err),
        }
    }

    fn sync_overlay(&mut self) -> Result<WindowHandle, TickError> {
        let handle = match self.locator.locate(&self.target)? {
            Lookup::Found(handle) => handle,
            Lookup::NotFound => return Err(TickError::NotFound),
        };
        if self.heartbeat {
            let frame = self.locator.capture(&handle).ok_or(TickError::CaptureFailed)?;
            debug!(width = frame.width, height = frame.height, "captured heartbeat frame");
        }

        let layout = resolve(handle.bounds, &self.params);
        self.surface.show_at(layout.outer)?;
        self.surface.set_grid(self.grid_enabled, layout.grid_columns)?;
        self.surface.set_annotation(self.annotation_enabled, layout.annotation)?;
        match layout.panel {
            Some(panel) => self.shell.show_panel_at(panel.x, panel.y, panel.height),
            None => self.shell.hide_panel(),
        }
        Ok(handle)
    }

    fn enter_absent(&mut self, err: TickError) {
        match &err {
            TickError::NotFound => {}
            other => warn!(error = %other, "tick failed"),
        }
        if self.state == TargetState::Present {
            info!(reason = %err, "target absent");
        }
        self.state = TargetState::Absent;
        if let Err(hide_err) = self.surface.hide() {
            warn!(error = %hide_err, "failed to hide overlay");
        }
        self.shell.hide_panel();
        self.shell.set_status(&absent_status(&self.target, &err));
    }

    fn acknowledge(&mut self, text: String) {
        self.shell.set_status(&Status::new(text, StatusColor::Blue));
    }

    fn shutdown(&mut self) {
        if let Err(err) = self.surface.hide() {
            warn!(error = %err, "failed to hide overlay on shutdown");
        }
        self.shell.hide_panel();
        info!("controller stopped");
    }
}

fn on_off(enabled: bool) -> &'static str { if enabled { "ON" } else { "OFF" } }

fn connected_status(target: &str, handle: &WindowHandle) -> Status {
    let b = handle.bounds;
    Status::new(
        format!("{target} connected  size: {}×{}  pos: {},{}", b.width, b.height, b.x, b.y),
        StatusColor::Green,
    )
}

fn absent_status(target: &str, err: &TickError) -> Status {
    match err {
        TickError::NotFound => Status::new(format!("{target} not found"), StatusColor::Red),
        TickError::CaptureFailed => Status::new(
            format!("{target} found, capture failed (check Screen Recording)"),
            StatusColor::Orange,
        ),
        TickError::Query(e) => Status::new(format!("Error: {e}"), StatusColor::Red),
        TickError::Surface(e) => Status::new(format!("Error: {e}"), StatusColor::Red),
    }
}
