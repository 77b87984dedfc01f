use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_BORDER_WIDTH: u32 = 100;
pub const MAX_MARGIN: u32 = 1000;
pub const MAX_PANEL_WIDTH: u32 = 2000;
pub const MAX_PANEL_GAP: u32 = 1000;

pub fn config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("surfwatch").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub target: TargetSettings,
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default)]
    pub panel: PanelSettings,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub annotation: AnnotationSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TargetSettings {
    /// Case-insensitive substring of the owning application's name.
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Capture a still of the target every tick and treat a failed capture
    /// as a warning state. Requires the Screen Recording permission.
    #[serde(default = "no")]
    pub heartbeat_capture: bool,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            poll_interval_ms: default_poll_interval_ms(),
            heartbeat_capture: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct OverlaySettings {
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    /// Padding between the target window and the overlay border, in pixels.
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default = "default_border_color")]
    pub color: ColorSettings,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            border_width: default_border_width(),
            margin: default_margin(),
            color: default_border_color(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct ColorSettings {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

impl ColorSettings {
    fn validate(&self, name: &str) -> Vec<String> {
        [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)]
            .into_iter()
            .filter(|(_, v)| !(0.0..=1.0).contains(v))
            .map(|(channel, v)| format!("{name}.{channel} ({v}) must be between 0 and 1"))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct PanelSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_panel_width")]
    pub width: u32,
    /// Horizontal gap between the overlay border and the panel.
    #[serde(default = "default_panel_gap")]
    pub gap: u32,
    /// Label of the first, wired button in the panel.
    #[serde(default = "default_action_label")]
    pub action_label: String,
    #[serde(default = "default_button_count")]
    pub button_count: usize,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_panel_width(),
            gap: default_panel_gap(),
            action_label: default_action_label(),
            button_count: default_button_count(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    /// Number of columns; values below 2 are clamped to 2.
    #[serde(default = "default_grid_columns")]
    pub columns: u32,
}

impl Default for GridSettings {
    fn default() -> Self { Self { columns: default_grid_columns() } }
}

/// Annotation rectangle placement, in percent of the target window size.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnnotationSettings {
    #[serde(default = "default_annotation_right")]
    pub right: f64,
    #[serde(default = "default_annotation_top")]
    pub top: f64,
    #[serde(default = "default_annotation_width")]
    pub width: f64,
    #[serde(default = "default_annotation_height")]
    pub height: f64,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            right: default_annotation_right(),
            top: default_annotation_top(),
            width: default_annotation_width(),
            height: default_annotation_height(),
        }
    }
}

impl TargetSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.owner.trim().is_empty() {
            issues.push("target.owner must not be empty".to_string());
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            issues.push(format!(
                "target.poll_interval_ms ({}) must be at least {}",
                self.poll_interval_ms, MIN_POLL_INTERVAL_MS
            ));
        }
        issues
    }
}

impl OverlaySettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(1..=MAX_BORDER_WIDTH).contains(&self.border_width) {
            issues.push(format!(
                "overlay.border_width ({}) must be between 1 and {MAX_BORDER_WIDTH}",
                self.border_width
            ));
        }
        if self.margin > MAX_MARGIN {
            issues.push(format!("overlay.margin ({}) must be at most {MAX_MARGIN}", self.margin));
        }
        issues.extend(self.color.validate("overlay.color"));
        issues
    }
}

impl PanelSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.enabled {
            return issues;
        }
        if !(1..=MAX_PANEL_WIDTH).contains(&self.width) {
            issues.push(format!(
                "panel.width ({}) must be between 1 and {MAX_PANEL_WIDTH}",
                self.width
            ));
        }
        if self.gap > MAX_PANEL_GAP {
            issues.push(format!("panel.gap ({}) must be at most {MAX_PANEL_GAP}", self.gap));
        }
        if self.button_count == 0 {
            issues.push("panel.button_count must be at least 1 when the panel is enabled".to_string());
        }
        issues
    }
}

impl GridSettings {
    /// Values that are accepted but adjusted.
    pub fn notices(&self) -> Vec<String> {
        if self.columns < 2 {
            vec![format!("grid.columns ({}) is below 2 and will be clamped to 2", self.columns)]
        } else {
            Vec::new()
        }
    }
}

impl AnnotationSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value) in [
            ("right", self.right),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !(0.0..=100.0).contains(&value) {
                issues.push(format!("annotation.{name} ({value}) must be between 0 and 100"));
            }
        }
        if self.right + self.width > 100.0 {
            issues.push("annotation.right + annotation.width must not exceed 100".to_string());
        }
        if self.top + self.height > 100.0 {
            issues.push("annotation.top + annotation.height must not exceed 100".to_string());
        }
        issues
    }
}

fn yes() -> bool { true }
fn no() -> bool { false }
fn opaque() -> f64 { 1.0 }

fn default_owner() -> String { "SurfTank".to_string() }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_border_width() -> u32 { 4 }
fn default_margin() -> u32 { 2 }
fn default_border_color() -> ColorSettings { ColorSettings { r: 1.0, g: 0.0, b: 0.0, a: 1.0 } }
fn default_panel_width() -> u32 { 220 }
fn default_panel_gap() -> u32 { 12 }
fn default_action_label() -> String { "ARENA".to_string() }
fn default_button_count() -> usize { 10 }
fn default_grid_columns() -> u32 { 10 }
fn default_annotation_right() -> f64 { 2.8 }
fn default_annotation_top() -> f64 { 7.0 }
fn default_annotation_width() -> f64 { 13.3 }
fn default_annotation_height() -> f64 { 15.5 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Reads `path` when it exists, otherwise falls back to the built-in defaults.
    pub fn read_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) if path.exists() => Self::read(path),
            _ => Ok(Config::default()),
        }
    }

    /// Validates the entire configuration and returns the errors found. A
    /// configuration with errors must not be run.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.target.validate());
        issues.extend(self.overlay.validate());
        issues.extend(self.panel.validate());
        issues.extend(self.annotation.validate());
        issues
    }

    /// Settings that are accepted but adjusted at runtime.
    pub fn notices(&self) -> Vec<String> { self.grid.notices() }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str::<Config>(buf)?) }
}
