//! Compile-time defaults.
//!
//! Values that the config schema falls back to, plus timing constants that
//! are not user-configurable. Kept as `const` so the render path never
//! recomputes them.

use std::time::Duration;

// =============================================================================
// Display
// =============================================================================

/// Default panel width in pixels.
pub const DISPLAY_WIDTH: u32 = 128;

/// Default panel height in pixels.
pub const DISPLAY_HEIGHT: u32 = 40;

/// Default frame period (10 FPS).
pub const REFRESH_RATE_MS: u64 = 100;

// =============================================================================
// Transitions
// =============================================================================

pub const TRANSITION_DURATION_S: f64 = 0.5;

// =============================================================================
// Metric widgets
// =============================================================================

pub const TEXT_FORMAT: &str = "%.0f";
pub const DUAL_TEXT_FORMAT: &str = "%.0f/%.0f";
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

pub const GRAPH_HISTORY: usize = 30;

/// Gauge arc gray level.
pub const GAUGE_ARC: u8 = 200;
pub const GAUGE_NEEDLE: u8 = 255;
pub const GAUGE_TICKS: u8 = 150;

/// Default bar/graph foreground.
pub const FOREGROUND: u8 = 255;

/// Secondary series gray level when a dual widget does not configure one.
pub const SECONDARY_FOREGROUND: u8 = 128;

// =============================================================================
// Indicator widgets
// =============================================================================

pub const AUTO_HIDE_TIMEOUT_S: f64 = 5.0;

/// Battery level at or below which the bluetooth widget blinks.
pub const LOW_BATTERY_PCT: f64 = 20.0;

pub const BLINK_PERIOD_MS: u64 = 1000;

pub const SCROLL_SPEED: f64 = 30.0;
pub const SCROLL_GAP: i32 = 20;
pub const SCROLL_PAUSE_MS: u64 = 1000;

/// Seconds without input after which the activity widget falls asleep.
pub const IDLE_TIMEOUT_S: f64 = 60.0;

// =============================================================================
// Pollers
// =============================================================================

pub const MEDIA_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const BLUETOOTH_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Hard limit on one blocking reader call made by a poller.
pub const READER_TIMEOUT: Duration = Duration::from_millis(2500);

// =============================================================================
// Diagnostics
// =============================================================================

/// Frames between periodic frame-metrics log lines.
pub const METRICS_LOG_INTERVAL: u64 = 100;

/// Widget types the factory knows how to build.
pub const WIDGET_KINDS: [&str; 14] = [
    "clock",
    "cpu",
    "memory",
    "disk",
    "gpu",
    "volume",
    "network",
    "disk_io",
    "keyboard",
    "bluetooth",
    "media",
    "beefweb",
    "clipboard",
    "activity",
];

/// Display modes understood by metric widgets.
pub const DISPLAY_MODES: [&str; 4] = ["text", "bar", "graph", "gauge"];
