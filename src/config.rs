//! Dashboard configuration: schema, YAML loading, validation.
//!
//! ```yaml
//! display: { width: 128, height: 40, background: 0, refresh_rate_ms: 100 }
//! transition: { type: dissolve_fade, duration_s: 0.5 }
//! widgets:
//!   - id: cpu
//!     type: cpu
//!     position: { x: 0, y: 0, w: 64, h: 20 }
//!     mode: graph
//!     graph: { history: 60 }
//! ```
//!
//! Every block except `id`, `type` and `position` is optional; omitted
//! fields take the defaults in [`constants`]. Widget constructors re-check
//! the parameters they consume.

pub mod constants;

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::animation::blink::BlinkMode;
use crate::animation::scroll::{ScrollDirection, ScrollMode};
use crate::bitmap::{BarDirection, BatteryOrientation, HAlign, VAlign};
use crate::error::ConfigError;
use crate::fonts;
use crate::transition::TransitionKind;

// =============================================================================
// Top level
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
    /// Drop widgets that fail to build instead of refusing to start.
    #[serde(default)]
    pub skip_broken_widgets: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub background: u8,
    pub refresh_rate_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: constants::DISPLAY_WIDTH,
            height: constants::DISPLAY_HEIGHT,
            background: 0,
            refresh_rate_ms: constants::REFRESH_RATE_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub duration_s: f64,
    /// Start a transition when a widget shows or hides.
    pub on_visibility_change: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            kind: TransitionKind::None,
            duration_s: constants::TRANSITION_DURATION_S,
            on_visibility_change: true,
        }
    }
}

// =============================================================================
// Widgets
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    #[serde(default)]
    pub style: StyleConfig,
    /// Display mode for metric widgets; `None` means text.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub gauge: GaugeConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub auto_hide: AutoHideConfig,
    #[serde(default)]
    pub blink: BlinkConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    /// Full-scale value for dual widgets in source units; `-1` auto-scales.
    #[serde(default = "auto_scale")]
    pub max_value: f64,
    /// Network full scale in megabits per second; overrides `max_value`.
    #[serde(default)]
    pub max_speed_mbps: Option<f64>,
    /// Rate unit for dual widget text: `Mbps`, `MB/s`, `KB/s` or `auto`.
    #[serde(default = "auto_unit")]
    pub unit: String,
    #[serde(default = "enabled")]
    pub show_unit: bool,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Text shown when the widget has no data.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Seconds of inactivity before the activity widget sleeps.
    #[serde(default)]
    pub idle_timeout_s: Option<f64>,
}

fn auto_scale() -> f64 { -1.0 }

fn auto_unit() -> String { "auto".to_string() }

const fn enabled() -> bool { true }

impl WidgetConfig {
    /// Config with every optional block at its default.
    pub fn new(
        id: &str,
        kind: &str,
        position: Position,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            position,
            style: StyleConfig::default(),
            mode: None,
            text: TextConfig::default(),
            bar: BarConfig::default(),
            graph: GraphConfig::default(),
            gauge: GaugeConfig::default(),
            scroll: ScrollConfig::default(),
            auto_hide: AutoHideConfig::default(),
            blink: BlinkConfig::default(),
            battery: BatteryConfig::default(),
            keyboard: KeyboardConfig::default(),
            max_value: auto_scale(),
            max_speed_mbps: None,
            unit: auto_unit(),
            show_unit: true,
            poll_interval_ms: None,
            placeholder: None,
            idle_timeout_s: None,
        }
    }

    /// Effective full-scale value; `max_speed_mbps` wins when set.
    pub fn effective_max(&self) -> f64 {
        match self.max_speed_mbps {
            Some(mbps) if mbps > 0.0 => mbps * 1_000_000.0 / 8.0,
            _ => self.max_value,
        }
    }
}

/// Widget rectangle and stacking order in display coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub z: i32,
}

impl Position {
    pub const fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        z: i32,
    ) -> Self {
        Self { x, y, w, h, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Gray level, or `-1` for a transparent background.
    pub background: i32,
    /// Border gray level; absent or `-1` draws none.
    pub border: Option<i32>,
    pub padding: i32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: 0,
            border: None,
            padding: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub size: u32,
    pub font: Option<String>,
    /// printf-style numeric format, strftime pattern or token template,
    /// depending on the widget type.
    pub format: Option<String>,
    pub align: AlignConfig,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            size: fonts::DEFAULT_TEXT_SIZE,
            font: None,
            format: None,
            align: AlignConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub h: HAlign,
    pub v: VAlign,
}

/// Named colors; each block reads the keys it understands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub fill: Option<i32>,
    pub line: Option<i32>,
    pub arc: Option<i32>,
    pub needle: Option<i32>,
    pub ticks: Option<i32>,
    pub rx: Option<i32>,
    pub tx: Option<i32>,
    pub read: Option<i32>,
    pub write: Option<i32>,
    pub rx_needle: Option<i32>,
    pub tx_needle: Option<i32>,
}

impl Colors {
    fn all(&self) -> [Option<i32>; 11] {
        [
            self.fill,
            self.line,
            self.arc,
            self.needle,
            self.ticks,
            self.rx,
            self.tx,
            self.read,
            self.write,
            self.rx_needle,
            self.tx_needle,
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub direction: BarDirection,
    pub border: bool,
    pub colors: Colors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub history: usize,
    pub colors: Colors,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            history: constants::GRAPH_HISTORY,
            colors: Colors::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub show_ticks: bool,
    pub colors: Colors,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            show_ticks: true,
            colors: Colors::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub enabled: bool,
    pub direction: ScrollDirection,
    /// Pixels per second.
    pub speed: f64,
    pub mode: ScrollMode,
    pub pause_ms: u64,
    pub gap: i32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            direction: ScrollDirection::Left,
            speed: constants::SCROLL_SPEED,
            mode: ScrollMode::Continuous,
            pause_ms: constants::SCROLL_PAUSE_MS,
            gap: constants::SCROLL_GAP,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutoHideConfig {
    pub enabled: bool,
    #[serde(alias = "timeout_seconds")]
    pub timeout_s: f64,
}

impl Default for AutoHideConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_s: constants::AUTO_HIDE_TIMEOUT_S,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub enabled: bool,
    pub mode: BlinkMode,
    pub period_ms: u64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: BlinkMode::Conditional,
            period_ms: constants::BLINK_PERIOD_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub orientation: BatteryOrientation,
    /// Gap between outline and fill.
    pub padding: i32,
    /// Level at or below which the battery counts as low.
    pub low_pct: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            orientation: BatteryOrientation::Horizontal,
            padding: 1,
            low_pct: constants::LOW_BATTERY_PCT,
        }
    }
}

/// Labels for the keyboard lock indicator tokens.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub caps: String,
    pub num: String,
    pub scroll: String,
    /// Text for a lock that is off.
    pub off: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            caps: "CAPS".to_string(),
            num: "NUM".to_string(),
            scroll: "SCRL".to_string(),
            off: String::new(),
        }
    }
}

// =============================================================================
// Loading & validation
// =============================================================================

impl DashboardConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        if d.width == 0 || d.height == 0 {
            return Err(ConfigError::Display(format!("size {}x{} must be non-zero", d.width, d.height)));
        }
        if d.refresh_rate_ms == 0 {
            return Err(ConfigError::Display("refresh_rate_ms must be at least 1".to_string()));
        }
        let duration = self.transition.duration_s;
        if !duration.is_finite() || duration < 0.0 {
            return Err(ConfigError::Transition(format!("duration_s {duration} must be a finite non-negative number")));
        }

        let mut seen = HashSet::new();
        for widget in &self.widgets {
            if !seen.insert(widget.id.as_str()) {
                return Err(ConfigError::DuplicateId(widget.id.clone()));
            }
            widget.validate()?;
        }
        Ok(())
    }
}

impl WidgetConfig {
    /// Per-widget checks shared by the loader and the widget factory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            id: self.id.clone(),
            message,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_string()));
        }
        if !constants::WIDGET_KINDS.contains(&self.kind.as_str()) {
            return Err(ConfigError::UnknownType {
                id: self.id.clone(),
                kind: self.kind.clone(),
            });
        }
        let p = self.position;
        if p.w < 1 || p.h < 1 {
            return Err(ConfigError::ZeroSize {
                id: self.id.clone(),
                w: p.w,
                h: p.h,
            });
        }
        if !(-1..=255).contains(&self.style.background) {
            return Err(ConfigError::Background {
                id: self.id.clone(),
                value: self.style.background,
            });
        }
        if let Some(border) = self.style.border
            && !(-1..=255).contains(&border)
        {
            return Err(invalid(format!("border {border} outside -1..=255")));
        }
        if self.style.padding < 0 {
            return Err(invalid(format!("padding {} must be >= 0", self.style.padding)));
        }
        if let Some(mode) = &self.mode
            && !constants::DISPLAY_MODES.contains(&mode.as_str())
        {
            return Err(ConfigError::UnknownMode {
                id: self.id.clone(),
                mode: mode.clone(),
            });
        }
        if let Some(font) = &self.text.font
            && !fonts::is_known_family(font)
        {
            return Err(invalid(format!("unknown font `{font}`")));
        }
        if self.graph.history == 0 {
            return Err(invalid("graph.history must be at least 1".to_string()));
        }
        let colors = [self.bar.colors.all(), self.graph.colors.all(), self.gauge.colors.all()];
        if let Some(bad) = colors.iter().flatten().flatten().find(|c| !(-1..=255).contains(*c)) {
            return Err(invalid(format!("color {bad} outside -1..=255")));
        }
        if !(self.scroll.speed.is_finite() && self.scroll.speed >= 0.0) {
            return Err(invalid(format!("scroll.speed {} must be >= 0", self.scroll.speed)));
        }
        if !(self.auto_hide.timeout_s.is_finite() && self.auto_hide.timeout_s >= 0.0) {
            return Err(invalid(format!("auto_hide.timeout_s {} must be >= 0", self.auto_hide.timeout_s)));
        }
        if self.blink.period_ms == 0 {
            return Err(invalid("blink.period_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}
