//! Data-source interfaces consumed by widgets, plus simulated sources.
//!
//! Widgets depend only on the traits here. Real probes (OS counters, HTTP
//! daemons, clipboard, input devices) live outside this crate; the driver
//! binary wires in the simulated readers from [`ReaderSet::simulated`],
//! which produce slow sine sweeps so every display mode has something to
//! show.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::WidgetError;

// =============================================================================
// Reader traits
// =============================================================================

/// Single scalar source, e.g. CPU load in percent.
pub trait MetricReader: Send + Sync {
    fn sample(&self) -> Result<f64, WidgetError>;

    /// Release handles. Called once from the widget's `stop`.
    fn close(&self) {}
}

/// Pair of rates in bytes per second, e.g. download/upload.
pub trait DualMetricReader: Send + Sync {
    fn sample(&self) -> Result<(f64, f64), WidgetError>;

    fn close(&self) {}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BluetoothDevice {
    pub name: String,
    pub connected: bool,
    /// Battery level in percent when the device reports one.
    pub battery: Option<f64>,
}

pub trait BluetoothReader: Send + Sync {
    /// Currently known devices; the first connected one is displayed.
    fn devices(&self) -> Result<Vec<BluetoothDevice>, WidgetError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackInfo {
    pub state: PlaybackState,
    pub artist: String,
    pub title: String,
    pub album: String,
}

pub trait MediaReader: Send + Sync {
    /// `Ok(None)` when no player is running.
    fn now_playing(&self) -> Result<Option<TrackInfo>, WidgetError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockState {
    pub caps: bool,
    pub num: bool,
    pub scroll: bool,
}

pub trait KeyboardReader: Send + Sync {
    fn locks(&self) -> Result<LockState, WidgetError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Image,
    #[default]
    Empty,
}

pub trait ClipboardReader: Send + Sync {
    fn read(&self) -> Result<(String, ContentType), WidgetError>;

    /// True when the content changed since the last call.
    fn has_changed(&self) -> bool;

    fn close(&self) {}
}

pub trait ActivityReader: Send + Sync {
    /// Time since the last user input.
    fn idle_for(&self) -> Result<Duration, WidgetError>;
}

// =============================================================================
// Reader registry
// =============================================================================

/// Readers available to widget constructors, keyed by widget type.
#[derive(Clone, Default)]
pub struct ReaderSet {
    metrics: HashMap<String, Arc<dyn MetricReader>>,
    dual: HashMap<String, Arc<dyn DualMetricReader>>,
    pub bluetooth: Option<Arc<dyn BluetoothReader>>,
    pub media: Option<Arc<dyn MediaReader>>,
    pub keyboard: Option<Arc<dyn KeyboardReader>>,
    pub clipboard: Option<Arc<dyn ClipboardReader>>,
    pub activity: Option<Arc<dyn ActivityReader>>,
}

impl ReaderSet {
    pub fn new() -> Self { Self::default() }

    pub fn with_metric(
        mut self,
        kind: &str,
        reader: Arc<dyn MetricReader>,
    ) -> Self {
        self.metrics.insert(kind.to_string(), reader);
        self
    }

    pub fn with_dual(
        mut self,
        kind: &str,
        reader: Arc<dyn DualMetricReader>,
    ) -> Self {
        self.dual.insert(kind.to_string(), reader);
        self
    }

    pub fn metric(
        &self,
        kind: &str,
    ) -> Option<Arc<dyn MetricReader>> {
        self.metrics.get(kind).cloned()
    }

    pub fn dual(
        &self,
        kind: &str,
    ) -> Option<Arc<dyn DualMetricReader>> {
        self.dual.get(kind).cloned()
    }

    /// Every widget type backed by a simulated source.
    pub fn simulated() -> Self {
        let start = Instant::now();
        let mut set = Self::new()
            .with_metric("cpu", Arc::new(SimMetric::new(start, 5.0, 95.0, 0.21)))
            .with_metric("memory", Arc::new(SimMetric::new(start, 35.0, 70.0, 0.05)))
            .with_metric("disk", Arc::new(SimMetric::new(start, 60.0, 64.0, 0.01)))
            .with_metric("gpu", Arc::new(SimMetric::new(start, 0.0, 100.0, 0.13)))
            .with_metric("volume", Arc::new(SimPeakMetric::new(start, 0.0, 100.0, 0.9)))
            .with_dual("network", Arc::new(SimDual::new(start, 4_000_000.0, 600_000.0, 0.17, 0.11)))
            .with_dual("disk_io", Arc::new(SimDual::new(start, 40_000_000.0, 12_000_000.0, 0.07, 0.19)));
        set.bluetooth = Some(Arc::new(SimBluetooth::new(start)));
        set.media = Some(Arc::new(SimMedia::new(start)));
        set.keyboard = Some(Arc::new(SimKeyboard::new(start)));
        set.clipboard = Some(Arc::new(SimClipboard::new(start)));
        set.activity = Some(Arc::new(SimActivity::new(start)));
        set
    }
}

// =============================================================================
// Simulated signals
// =============================================================================

/// Sine sweep between `min` and `max`.
pub fn fake_signal(
    t: f64,
    min: f64,
    max: f64,
    freq: f64,
) -> f64 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// Like [`fake_signal`] but holds at `max` for about 11% of each cycle
/// (phase between 1.2 and 1.9 radians).
pub fn peak_signal(
    t: f64,
    min: f64,
    max: f64,
    freq: f64,
) -> f64 {
    let cycle = (t * freq) % TAU;
    let normalized = if cycle > 1.2 && cycle < 1.9 {
        1.0
    } else {
        cycle.sin().mul_add(0.5, 0.5)
    };
    min + normalized * (max - min)
}

#[inline]
fn seconds_since(start: Instant) -> f64 { start.elapsed().as_secs_f64() }

/// Which `period`-long slot `t` falls in.
#[inline]
fn slot(
    t: f64,
    period: f64,
) -> u64 {
    (t / period).floor().max(0.0) as u64
}

pub struct SimMetric {
    start: Instant,
    min: f64,
    max: f64,
    freq: f64,
}

impl SimMetric {
    pub const fn new(
        start: Instant,
        min: f64,
        max: f64,
        freq: f64,
    ) -> Self {
        Self { start, min, max, freq }
    }
}

impl MetricReader for SimMetric {
    fn sample(&self) -> Result<f64, WidgetError> { Ok(fake_signal(seconds_since(self.start), self.min, self.max, self.freq)) }
}

/// Level meter that dwells on its peak.
pub struct SimPeakMetric(SimMetric);

impl SimPeakMetric {
    pub const fn new(
        start: Instant,
        min: f64,
        max: f64,
        freq: f64,
    ) -> Self {
        Self(SimMetric::new(start, min, max, freq))
    }
}

impl MetricReader for SimPeakMetric {
    fn sample(&self) -> Result<f64, WidgetError> {
        let m = &self.0;
        Ok(peak_signal(seconds_since(m.start), m.min, m.max, m.freq))
    }
}

/// Source that is never available, for exercising fallbacks.
pub struct UnavailableMetric(pub &'static str);

impl MetricReader for UnavailableMetric {
    fn sample(&self) -> Result<f64, WidgetError> { Err(WidgetError::Unavailable(self.0.to_string())) }
}

pub struct SimDual {
    start: Instant,
    primary_max: f64,
    secondary_max: f64,
    primary_freq: f64,
    secondary_freq: f64,
}

impl SimDual {
    pub const fn new(
        start: Instant,
        primary_max: f64,
        secondary_max: f64,
        primary_freq: f64,
        secondary_freq: f64,
    ) -> Self {
        Self {
            start,
            primary_max,
            secondary_max,
            primary_freq,
            secondary_freq,
        }
    }
}

impl DualMetricReader for SimDual {
    fn sample(&self) -> Result<(f64, f64), WidgetError> {
        let t = seconds_since(self.start);
        Ok((
            fake_signal(t, 0.0, self.primary_max, self.primary_freq),
            fake_signal(t, 0.0, self.secondary_max, self.secondary_freq),
        ))
    }
}

/// Headset that connects for 40 s out of every minute while its battery drains.
pub struct SimBluetooth {
    start: Instant,
}

impl SimBluetooth {
    pub const fn new(start: Instant) -> Self { Self { start } }
}

impl BluetoothReader for SimBluetooth {
    fn devices(&self) -> Result<Vec<BluetoothDevice>, WidgetError> {
        let t = seconds_since(self.start);
        let connected = t % 60.0 < 40.0;
        let battery = 100.0 - (t / 6.0) % 100.0;
        Ok(vec![BluetoothDevice {
            name: "Headset".to_string(),
            connected,
            battery: connected.then_some(battery.round()),
        }])
    }
}

const TRACKS: [(&str, &str, &str); 3] = [
    ("Boards of Canada", "Roygbiv", "Music Has the Right to Children"),
    ("Aphex Twin", "Xtal", "Selected Ambient Works 85-92"),
    ("Autechre", "Bike", "Amber"),
];

/// Player cycling through a short playlist; idle for the last 10 s of each
/// 70 s round, paused for a few seconds mid-track.
pub struct SimMedia {
    start: Instant,
}

impl SimMedia {
    pub const fn new(start: Instant) -> Self { Self { start } }
}

impl MediaReader for SimMedia {
    fn now_playing(&self) -> Result<Option<TrackInfo>, WidgetError> {
        let t = seconds_since(self.start) % 70.0;
        if t >= 60.0 {
            return Ok(None);
        }
        let (artist, title, album) = TRACKS[slot(t, 20.0) as usize % TRACKS.len()];
        let state = if t % 20.0 > 14.0 && t % 20.0 < 17.0 {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        };
        Ok(Some(TrackInfo {
            state,
            artist: artist.to_string(),
            title: title.to_string(),
            album: album.to_string(),
        }))
    }
}

pub struct SimKeyboard {
    start: Instant,
}

impl SimKeyboard {
    pub const fn new(start: Instant) -> Self { Self { start } }
}

impl KeyboardReader for SimKeyboard {
    fn locks(&self) -> Result<LockState, WidgetError> {
        let t = seconds_since(self.start);
        Ok(LockState {
            caps: slot(t, 7.0) % 2 == 1,
            num: true,
            scroll: slot(t, 23.0) % 3 == 2,
        })
    }
}

const CLIPS: [&str; 4] = [
    "cargo test --workspace",
    "https://docs.rs/embedded-graphics",
    "",
    "fn main() { println!(\"hello\"); }",
];

/// Clipboard whose content changes every 10 s.
pub struct SimClipboard {
    start: Instant,
    seen: AtomicU64,
}

impl SimClipboard {
    pub const fn new(start: Instant) -> Self {
        Self {
            start,
            seen: AtomicU64::new(u64::MAX),
        }
    }

    fn generation(&self) -> u64 { slot(seconds_since(self.start), 10.0) }
}

impl ClipboardReader for SimClipboard {
    fn read(&self) -> Result<(String, ContentType), WidgetError> {
        let clip = CLIPS[self.generation() as usize % CLIPS.len()];
        let kind = if clip.is_empty() { ContentType::Image } else { ContentType::Text };
        Ok((clip.to_string(), kind))
    }

    fn has_changed(&self) -> bool {
        let current = self.generation();
        self.seen.swap(current, Ordering::AcqRel) != current
    }
}

/// User active for 20 s, then idle for 100 s.
pub struct SimActivity {
    start: Instant,
}

impl SimActivity {
    pub const fn new(start: Instant) -> Self { Self { start } }
}

impl ActivityReader for SimActivity {
    fn idle_for(&self) -> Result<Duration, WidgetError> {
        let t = seconds_since(self.start) % 120.0;
        let idle = if t < 20.0 { t % 2.0 } else { t - 20.0 };
        Ok(Duration::from_secs_f64(idle))
    }
}
