//! Frame loop: stacks widget canvases into the display framebuffer and
//! hands the result to an [`OutputSink`].
//!
//! [`FrameEngine`] does the per-frame work synchronously and is what the
//! tests drive. [`Compositor`] owns an engine behind a mutex and runs it on
//! a `tokio` interval, together with every widget's pollers.
//!
//! Lifecycle: `new` -> `start` -> `stop`. A stopped compositor has closed
//! its readers and cannot be started again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::canvas::GrayCanvas;
use crate::config::{DashboardConfig, DisplayConfig, TransitionConfig, WidgetConfig};
use crate::error::{ConfigError, DashboardError, SinkError, WidgetError};
use crate::profiling::{DebugLog, FrameMetrics};
use crate::readers::ReaderSet;
use crate::sink::OutputSink;
use crate::transition::Transition;
use crate::widget::{Widget, lock_state};
use crate::widgets::build_widget;

// =============================================================================
// Widget construction
// =============================================================================

/// Build every configured widget, in configuration order.
///
/// A widget that fails validation or construction aborts the build unless
/// `skip_broken_widgets` is set, in which case it is logged and left out.
pub fn build_widgets(
    config: &DashboardConfig,
    readers: &ReaderSet,
) -> Result<Vec<Box<dyn Widget>>, DashboardError> {
    let mut widgets = Vec::with_capacity(config.widgets.len());
    for widget_config in &config.widgets {
        match build_one(widget_config, readers) {
            Ok(widget) => widgets.push(widget),
            Err(source) if config.skip_broken_widgets => {
                warn!(widget = %widget_config.id, error = %source, "skipping broken widget");
            }
            Err(source) => {
                return Err(DashboardError::Widget {
                    id: widget_config.id.clone(),
                    source,
                });
            }
        }
    }
    Ok(widgets)
}

fn build_one(
    config: &WidgetConfig,
    readers: &ReaderSet,
) -> Result<Box<dyn Widget>, WidgetError> {
    config.validate().map_err(|e| WidgetError::Config(e.to_string()))?;
    build_widget(config, readers)
}

/// Stable sort by z; equal z keeps configuration order.
fn sort_by_z(widgets: &mut [Box<dyn Widget>]) { widgets.sort_by_key(|w| w.position().z); }

// =============================================================================
// Frame engine
// =============================================================================

/// Per-frame state: widget stack, last delivered frame, running transition.
pub struct FrameEngine {
    display: DisplayConfig,
    transition_config: TransitionConfig,
    widgets: Vec<Box<dyn Widget>>,
    sink: Box<dyn OutputSink>,
    last_frame: Option<GrayCanvas>,
    transition: Option<Transition>,
    /// Ids drawn in the previous frame; `None` before the first frame.
    visible: Option<HashSet<String>>,
    /// Ids whose last `update` failed, so the warning fires once.
    failing: HashSet<String>,
    metrics: FrameMetrics,
    log: DebugLog,
}

impl FrameEngine {
    pub fn new(
        display: DisplayConfig,
        transition_config: TransitionConfig,
        mut widgets: Vec<Box<dyn Widget>>,
        sink: Box<dyn OutputSink>,
    ) -> Self {
        sort_by_z(&mut widgets);
        Self {
            display,
            transition_config,
            widgets,
            sink,
            last_frame: None,
            transition: None,
            visible: None,
            failing: HashSet::new(),
            metrics: FrameMetrics::new(),
            log: DebugLog::new(),
        }
    }

    /// Widgets in draw order.
    pub fn widgets(&self) -> &[Box<dyn Widget>] { &self.widgets }

    #[inline]
    pub const fn metrics(&self) -> &FrameMetrics { &self.metrics }

    /// Recent notable events, oldest first.
    pub fn recent_events(&self) -> Vec<String> { self.log.iter().map(str::to_string).collect() }

    #[inline]
    pub const fn in_transition(&self) -> bool { self.transition.is_some() }

    /// Swap in a new widget set, transitioning away from the last frame.
    /// Returns the previous widgets so the caller can stop them.
    pub fn replace_widgets(
        &mut self,
        mut widgets: Vec<Box<dyn Widget>>,
        now: Instant,
    ) -> Vec<Box<dyn Widget>> {
        sort_by_z(&mut widgets);
        let old = std::mem::replace(&mut self.widgets, widgets);
        self.failing.clear();
        self.visible = None;
        self.log.push("widgets replaced");
        self.begin_transition(now, "reconfigure");
        old
    }

    /// Compose and deliver one frame at `now`.
    ///
    /// Only a sink that reports itself unavailable is an error; every other
    /// failure is logged and the frame goes on.
    pub fn render_frame(
        &mut self,
        now: Instant,
    ) -> Result<(), SinkError> {
        let frame_start = Instant::now();
        let (composed, drawn) = self.compose();
        let render_time = frame_start.elapsed();

        if let Some(previous) = self.visible.replace(drawn)
            && self.transition_config.on_visibility_change
            && self.visible.as_ref() != Some(&previous)
        {
            self.begin_transition(now, "visibility");
        }

        let (out, in_transition) = self.apply_transition(composed, now);

        if let Err(err) = self.sink.deliver_frame(&out) {
            self.metrics.inc_sink_errors();
            error!(error = %err, "frame delivery failed");
            if matches!(err, SinkError::Unavailable(_)) {
                self.log.push("sink unavailable");
                return Err(err);
            }
        }

        self.last_frame = Some(out);
        self.metrics.record_frame(frame_start.elapsed(), render_time, in_transition);
        self.metrics.maybe_log();
        Ok(())
    }

    /// Background plus every visible widget in z order; returns the ids drawn.
    fn compose(&mut self) -> (GrayCanvas, HashSet<String>) {
        let mut frame = GrayCanvas::filled(self.display.width, self.display.height, self.display.background);
        let mut drawn = HashSet::new();

        for widget in &self.widgets {
            let id = widget.id();
            match widget.update() {
                Ok(()) => {
                    if self.failing.remove(id) {
                        info!(widget = %id, "widget recovered");
                    }
                }
                Err(err) => {
                    if self.failing.insert(id.to_string()) {
                        warn!(widget = %id, error = %err, "update failed, keeping last state");
                        self.log.push(&format!("{id}: {err}"));
                    }
                }
            }

            let canvas = match widget.render() {
                Ok(Some(canvas)) => canvas,
                Ok(None) => continue,
                Err(err) => {
                    self.metrics.inc_render_errors();
                    warn!(widget = %id, error = %err, "render failed, skipping widget this frame");
                    continue;
                }
            };

            let pos = widget.position();
            debug_assert!(
                canvas.width() == pos.w as u32 && canvas.height() == pos.h as u32,
                "widget {id} rendered {}x{}, expected {}x{}",
                canvas.width(),
                canvas.height(),
                pos.w,
                pos.h
            );
            let canvas = clip_to(canvas, pos.w, pos.h);
            frame.blit(&canvas, pos.x, pos.y, widget.style().is_transparent());
            drawn.insert(id.to_string());
        }

        (frame, drawn)
    }

    fn begin_transition(
        &mut self,
        now: Instant,
        reason: &str,
    ) {
        let duration = Duration::from_secs_f64(self.transition_config.duration_s.max(0.0));
        let Some(old) = self.last_frame.clone() else {
            return;
        };
        if duration.is_zero() {
            return;
        }
        let transition = Transition::start(self.transition_config.kind, duration, old, now);
        debug!(kind = ?transition.kind(), reason, "transition started");
        self.log.push(&format!("transition {:?} ({reason})", transition.kind()));
        self.transition = Some(transition);
    }

    /// Blend `composed` with the running transition, if any.
    fn apply_transition(
        &mut self,
        composed: GrayCanvas,
        now: Instant,
    ) -> (GrayCanvas, bool) {
        let Some(transition) = &self.transition else {
            return (composed, false);
        };
        if transition.is_finished(now) {
            debug!(kind = ?transition.kind(), "transition finished");
            self.transition = None;
            return (composed, false);
        }
        (transition.render(&composed, now), true)
    }
}

/// Crop an oversized canvas to the widget rectangle.
fn clip_to(
    canvas: GrayCanvas,
    w: i32,
    h: i32,
) -> GrayCanvas {
    if canvas.width() as i32 <= w && canvas.height() as i32 <= h {
        return canvas;
    }
    let mut clipped = GrayCanvas::new(w.max(1) as u32, h.max(1) as u32);
    clipped.blit(&canvas, 0, 0, false);
    clipped
}

// =============================================================================
// Compositor
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Stopped,
}

/// Pollers of one widget generation and the channel that stops them.
struct PollerSet {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl PollerSet {
    fn start(widgets: &[Box<dyn Widget>]) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let handles = widgets.iter().flat_map(|w| w.start_pollers(&rx)).collect();
        Self { shutdown, handles }
    }

    async fn stop(self) {
        self.shutdown.send(true).ok();
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "poller task did not exit cleanly");
            }
        }
    }
}

pub struct Compositor {
    engine: Arc<Mutex<FrameEngine>>,
    refresh: Duration,
    phase: Phase,
    pollers: Option<PollerSet>,
    frame_shutdown: Option<watch::Sender<bool>>,
    frame_task: Option<JoinHandle<Result<(), SinkError>>>,
}

impl Compositor {
    /// Build every widget and prepare the frame engine. Nothing runs until
    /// [`Compositor::start`].
    pub fn new(
        config: &DashboardConfig,
        readers: &ReaderSet,
        sink: Box<dyn OutputSink>,
    ) -> Result<Self, DashboardError> {
        let display_config = &config.display;
        if display_config.width == 0 || display_config.height == 0 {
            return Err(ConfigError::Display(format!("size {}x{} must be non-zero", display_config.width, display_config.height)).into());
        }
        let widgets = build_widgets(config, readers)?;
        info!(
            widgets = widgets.len(),
            width = display_config.width,
            height = display_config.height,
            refresh_ms = display_config.refresh_rate_ms,
            "compositor ready"
        );
        Ok(Self {
            engine: Arc::new(Mutex::new(FrameEngine::new(
                display_config.clone(),
                config.transition.clone(),
                widgets,
                sink,
            ))),
            refresh: Duration::from_millis(display_config.refresh_rate_ms.max(1)),
            phase: Phase::Idle,
            pollers: None,
            frame_shutdown: None,
            frame_task: None,
        })
    }

    #[inline]
    pub fn is_running(&self) -> bool { self.phase == Phase::Running }

    /// Shared handle to the engine, for inspection.
    pub fn engine(&self) -> Arc<Mutex<FrameEngine>> { Arc::clone(&self.engine) }

    /// Spawn widget pollers and the frame loop on the current runtime.
    pub fn start(&mut self) -> Result<(), DashboardError> {
        match self.phase {
            Phase::Running => return Err(DashboardError::State("already running")),
            Phase::Stopped => return Err(DashboardError::State("already stopped")),
            Phase::Idle => {}
        }

        self.pollers = Some(PollerSet::start(lock_state(&self.engine).widgets()));

        let (tx, mut shutdown) = watch::channel(false);
        let engine = Arc::clone(&self.engine);
        let refresh = self.refresh;
        self.frame_task = Some(tokio::spawn(async move {
            let mut ticker = interval(refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            return Ok(());
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(err) = lock_state(&engine).render_frame(Instant::now()) {
                            return Err(err);
                        }
                    }
                }
            }
        }));
        self.frame_shutdown = Some(tx);
        self.phase = Phase::Running;
        info!(refresh_ms = refresh.as_millis() as u64, "compositor started");
        Ok(())
    }

    /// Resolve when the frame loop ends on its own (sink gone). Pending
    /// forever while the loop runs normally.
    pub async fn finished(&mut self) -> Result<(), DashboardError> {
        let Some(task) = self.frame_task.as_mut() else {
            return Err(DashboardError::State("not running"));
        };
        let result = task.await;
        self.frame_task = None;
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => {
                error!(error = %err, "frame loop aborted");
                Err(DashboardError::State("frame loop aborted"))
            }
        }
    }

    /// Cancel the frame loop and pollers, wait for them, then release every
    /// widget's readers.
    pub async fn stop(&mut self) -> Result<(), DashboardError> {
        if self.phase != Phase::Running {
            return Err(DashboardError::State("not running"));
        }

        if let Some(tx) = self.frame_shutdown.take() {
            tx.send(true).ok();
        }
        if let Some(task) = self.frame_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(error = %err, "frame loop had already ended"),
                Err(err) => warn!(error = %err, "frame loop did not exit cleanly"),
            }
        }
        if let Some(pollers) = self.pollers.take() {
            pollers.stop().await;
        }

        let engine = lock_state(&self.engine);
        for widget in engine.widgets() {
            widget.stop();
        }
        info!(frames = engine.metrics().total_frames, uptime = %engine.metrics().uptime_string(), "compositor stopped");
        drop(engine);

        self.phase = Phase::Stopped;
        Ok(())
    }

    /// Swap the widget set, transitioning from the last delivered frame.
    /// Old pollers are joined and old widgets stopped before returning.
    pub async fn replace_widgets(
        &mut self,
        widgets: Vec<Box<dyn Widget>>,
    ) -> Result<(), DashboardError> {
        if self.phase == Phase::Stopped {
            return Err(DashboardError::State("already stopped"));
        }
        if let Some(pollers) = self.pollers.take() {
            pollers.stop().await;
        }

        let mut engine = lock_state(&self.engine);
        let old = engine.replace_widgets(widgets, Instant::now());
        if self.phase == Phase::Running {
            self.pollers = Some(PollerSet::start(engine.widgets()));
        }
        drop(engine);

        for widget in &old {
            widget.stop();
        }
        info!(replaced = old.len(), "widgets replaced");
        Ok(())
    }

    /// Rebuild widgets from `config`. Display geometry cannot change.
    pub async fn reload(
        &mut self,
        config: &DashboardConfig,
        readers: &ReaderSet,
    ) -> Result<(), DashboardError> {
        let same_size = {
            let engine = lock_state(&self.engine);
            engine.display.width == config.display.width && engine.display.height == config.display.height
        };
        if !same_size {
            return Err(DashboardError::State("cannot change display size on reload"));
        }
        let widgets = build_widgets(config, readers)?;
        lock_state(&self.engine).transition_config = config.transition.clone();
        self.replace_widgets(widgets).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::config::Position;
    use crate::sink::{FrameLog, MemorySink};
    use crate::transition::TransitionKind;
    use crate::widget::BaseWidget;

    const W: u32 = 16;
    const H: u32 = 8;

    /// Fills its rectangle (or the left half) with one value.
    struct Solid {
        base: BaseWidget,
        value: u8,
        half: bool,
        visible: AtomicBool,
        fail_render: bool,
        fail_update: AtomicBool,
        updates: AtomicUsize,
        renders: AtomicUsize,
    }

    impl Solid {
        fn new(
            id: &str,
            position: Position,
            value: u8,
        ) -> Self {
            Self::with_config(WidgetConfig::new(id, "clock", position), value)
        }

        fn with_config(
            config: WidgetConfig,
            value: u8,
        ) -> Self {
            Self {
                base: BaseWidget::new(&config),
                value,
                half: false,
                visible: AtomicBool::new(true),
                fail_render: false,
                fail_update: AtomicBool::new(false),
                updates: AtomicUsize::new(0),
                renders: AtomicUsize::new(0),
            }
        }

        fn full(
            id: &str,
            z: i32,
            value: u8,
        ) -> Self {
            Self::new(id, Position::new(0, 0, W as i32, H as i32, z), value)
        }
    }

    impl Widget for Arc<Solid> {
        fn base(&self) -> &BaseWidget { &self.base }

        fn update(&self) -> Result<(), WidgetError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(WidgetError::Unavailable("probe failed".into()));
            }
            Ok(())
        }

        fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if self.fail_render {
                return Err(WidgetError::Render("boom".into()));
            }
            if !self.visible.load(Ordering::SeqCst) {
                return Ok(None);
            }
            let mut canvas = self.base.create_canvas();
            let w = if self.half { self.base.position().w / 2 } else { self.base.position().w };
            canvas.fill_rect(0, 0, w, self.base.position().h, self.value);
            Ok(Some(canvas))
        }
    }

    fn boxed(widgets: &[Arc<Solid>]) -> Vec<Box<dyn Widget>> {
        widgets.iter().map(|w| Box::new(Arc::clone(w)) as Box<dyn Widget>).collect()
    }

    fn display(background: u8) -> DisplayConfig {
        DisplayConfig {
            width: W,
            height: H,
            background,
            refresh_rate_ms: 10,
        }
    }

    fn engine_with(
        widgets: &[Arc<Solid>],
        transition: TransitionConfig,
        background: u8,
    ) -> (FrameEngine, FrameLog) {
        let sink = MemorySink::new(W, H, 4);
        let log = sink.log();
        (FrameEngine::new(display(background), transition, boxed(widgets), Box::new(sink)), log)
    }

    fn no_transition() -> TransitionConfig {
        TransitionConfig {
            on_visibility_change: false,
            ..TransitionConfig::default()
        }
    }

    fn fade(duration_s: f64) -> TransitionConfig {
        TransitionConfig {
            kind: TransitionKind::DissolveFade,
            duration_s,
            on_visibility_change: true,
        }
    }

    fn last_pixel(
        log: &FrameLog,
        x: i32,
        y: i32,
    ) -> Option<u8> {
        log.last().and_then(|f| f.get(x, y))
    }

    #[test]
    fn test_background_only_frame() {
        let (mut engine, log) = engine_with(&[], no_transition(), 42);
        engine.render_frame(Instant::now()).expect("sink accepts");
        let frame = log.last().expect("frame delivered");
        assert_eq!(frame.count_value(42), (W * H) as usize, "Empty dashboard is all background");
    }

    #[test]
    fn test_higher_z_draws_on_top() {
        let top = Arc::new(Solid::full("top", 5, 200));
        let bottom = Arc::new(Solid::full("bottom", 1, 100));
        let (mut engine, log) = engine_with(&[top, bottom], no_transition(), 0);
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, 3, 3), Some(200));
        let order: Vec<&str> = engine.widgets().iter().map(|w| w.id()).collect();
        assert_eq!(order, vec!["bottom", "top"]);
    }

    #[test]
    fn test_equal_z_keeps_config_order() {
        let first = Arc::new(Solid::full("first", 0, 10));
        let second = Arc::new(Solid::full("second", 0, 20));
        let (mut engine, log) = engine_with(&[first, second], no_transition(), 0);
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(20), "Later widget with equal z is drawn last");
    }

    #[test]
    fn test_transparent_widget_skips_zero_pixels() {
        let mut cfg = WidgetConfig::new("overlay", "clock", Position::new(0, 0, W as i32, H as i32, 1));
        cfg.style.background = -1;
        let mut overlay = Solid::with_config(cfg, 255);
        overlay.half = true;
        let (mut engine, log) = engine_with(&[Arc::new(overlay)], no_transition(), 50);
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(255));
        assert_eq!(last_pixel(&log, W as i32 - 1, 0), Some(50), "Zero pixels let the display background through");
    }

    #[test]
    fn test_opaque_widget_covers_background() {
        let mut solid = Solid::full("solid", 0, 255);
        solid.half = true;
        let (mut engine, log) = engine_with(&[Arc::new(solid)], no_transition(), 50);
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, W as i32 - 1, 0), Some(0), "Opaque widget background overwrites the display");
    }

    #[test]
    fn test_widget_positioned_partly_offscreen_is_clipped() {
        let w = Arc::new(Solid::new("edge", Position::new(12, 6, 8, 8, 0), 99));
        let (mut engine, log) = engine_with(&[w], no_transition(), 0);
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, 15, 7), Some(99));
        assert_eq!(last_pixel(&log, 11, 5), Some(0));
    }

    #[test]
    fn test_render_error_skips_widget() {
        let mut broken = Solid::full("broken", 1, 200);
        broken.fail_render = true;
        let broken = Arc::new(broken);
        let (mut engine, log) = engine_with(&[Arc::clone(&broken)], no_transition(), 7);
        engine.render_frame(Instant::now()).expect("sink accepts");
        engine.render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(7), "Failed widget contributes nothing");
        assert_eq!(engine.metrics().render_errors, 2);
        assert_eq!(broken.renders.load(Ordering::SeqCst), 2, "Widget stays registered");
    }

    #[test]
    fn test_update_error_keeps_rendering_and_logs_once() {
        let stale = Arc::new(Solid::full("stale", 0, 77));
        stale.fail_update.store(true, Ordering::SeqCst);
        let (mut engine, log) = engine_with(&[Arc::clone(&stale)], no_transition(), 0);
        for _ in 0..3 {
            engine.render_frame(Instant::now()).expect("sink accepts");
        }
        assert_eq!(last_pixel(&log, 0, 0), Some(77), "Stale data is still drawn");
        assert_eq!(stale.updates.load(Ordering::SeqCst), 3, "Update runs before every render");
        let failures = engine.recent_events().iter().filter(|e| e.starts_with("stale:")).count();
        assert_eq!(failures, 1, "Repeated failure is reported once");

        stale.fail_update.store(false, Ordering::SeqCst);
        engine.render_frame(Instant::now()).expect("sink accepts");
        stale.fail_update.store(true, Ordering::SeqCst);
        engine.render_frame(Instant::now()).expect("sink accepts");
        let failures = engine.recent_events().iter().filter(|e| e.starts_with("stale:")).count();
        assert_eq!(failures, 2, "A new failure after recovery is reported again");
    }

    #[test]
    fn test_visibility_change_fades() {
        let w = Arc::new(Solid::full("popup", 0, 255));
        let (mut engine, log) = engine_with(&[Arc::clone(&w)], fade(1.0), 0);
        let t0 = Instant::now();
        engine.render_frame(t0).expect("sink accepts");
        assert!(!engine.in_transition(), "First frame has nothing to transition from");

        w.visible.store(false, Ordering::SeqCst);
        engine.render_frame(t0).expect("sink accepts");
        assert!(engine.in_transition());
        assert_eq!(last_pixel(&log, 0, 0), Some(255), "Progress 0 shows the old frame");

        engine.render_frame(t0 + Duration::from_millis(500)).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(128), "Halfway fade");

        engine.render_frame(t0 + Duration::from_secs(2)).expect("sink accepts");
        assert!(!engine.in_transition(), "Finished transition is released");
        assert_eq!(last_pixel(&log, 0, 0), Some(0));
        assert!(engine.metrics().transition_frames >= 2);
    }

    #[test]
    fn test_visibility_change_ignored_when_disabled() {
        let w = Arc::new(Solid::full("popup", 0, 255));
        let (mut engine, log) = engine_with(
            &[Arc::clone(&w)],
            TransitionConfig {
                on_visibility_change: false,
                ..fade(1.0)
            },
            0,
        );
        let t0 = Instant::now();
        engine.render_frame(t0).expect("sink accepts");
        w.visible.store(false, Ordering::SeqCst);
        engine.render_frame(t0).expect("sink accepts");
        assert!(!engine.in_transition());
        assert_eq!(last_pixel(&log, 0, 0), Some(0), "Hidden widget disappears at once");
    }

    #[test]
    fn test_zero_duration_never_transitions() {
        let w = Arc::new(Solid::full("popup", 0, 255));
        let (mut engine, _log) = engine_with(&[Arc::clone(&w)], fade(0.0), 0);
        let t0 = Instant::now();
        engine.render_frame(t0).expect("sink accepts");
        w.visible.store(false, Ordering::SeqCst);
        engine.render_frame(t0).expect("sink accepts");
        assert!(!engine.in_transition());
    }

    #[test]
    fn test_replace_widgets_transitions_from_last_frame() {
        let old = Arc::new(Solid::full("old", 0, 200));
        let (mut engine, log) = engine_with(&[old], fade(1.0), 0);
        let t0 = Instant::now();
        engine.render_frame(t0).expect("sink accepts");

        let new = Arc::new(Solid::full("new", 0, 100));
        let replaced = engine.replace_widgets(boxed(&[new]), t0);
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].id(), "old");
        assert!(engine.in_transition());

        engine.render_frame(t0 + Duration::from_millis(500)).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(150));
        engine.render_frame(t0 + Duration::from_secs(1)).expect("sink accepts");
        assert_eq!(last_pixel(&log, 0, 0), Some(100));
    }

    struct GoneSink;

    impl OutputSink for GoneSink {
        fn deliver_frame(
            &mut self,
            _frame: &GrayCanvas,
        ) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("unplugged".into()))
        }
    }

    #[test]
    fn test_unavailable_sink_ends_frame() {
        let mut engine = FrameEngine::new(display(0), no_transition(), Vec::new(), Box::new(GoneSink));
        let err = engine.render_frame(Instant::now()).expect_err("sink is gone");
        assert!(matches!(err, SinkError::Unavailable(_)));
        assert_eq!(engine.metrics().sink_errors, 1);
        assert_eq!(engine.metrics().total_frames, 0, "Undelivered frame is not counted");
    }

    #[test]
    fn test_wrong_sized_sink_keeps_running() {
        let sink = MemorySink::new(W + 1, H, 1);
        let mut engine = FrameEngine::new(display(0), no_transition(), Vec::new(), Box::new(sink));
        engine.render_frame(Instant::now()).expect("size mismatch is not fatal");
        assert_eq!(engine.metrics().sink_errors, 1);
    }

    proptest! {
        #[test]
        fn prop_topmost_pixel_belongs_to_highest_z(zs in proptest::collection::vec(-3i32..3, 1..8)) {
            let widgets: Vec<Arc<Solid>> = zs
                .iter()
                .enumerate()
                .map(|(i, &z)| Arc::new(Solid::full(&format!("w{i}"), z, (i + 1) as u8)))
                .collect();
            let (mut engine, log) = engine_with(&widgets, no_transition(), 0);
            engine.render_frame(Instant::now()).expect("sink accepts");

            let max_z = zs.iter().copied().max().unwrap_or_default();
            let winner = zs.iter().rposition(|&z| z == max_z).unwrap_or_default();
            prop_assert_eq!(last_pixel(&log, 0, 0), Some((winner + 1) as u8));

            let drawn: Vec<i32> = engine.widgets().iter().map(|w| w.position().z).collect();
            prop_assert!(drawn.windows(2).all(|p| p[0] <= p[1]), "Draw order ascends by z");
        }
    }

    // =========================================================================
    // Compositor lifecycle
    // =========================================================================

    fn dashboard(widgets: Vec<WidgetConfig>) -> DashboardConfig {
        DashboardConfig {
            display: display(0),
            transition: no_transition(),
            widgets,
            skip_broken_widgets: false,
        }
    }

    fn clock(id: &str) -> WidgetConfig { WidgetConfig::new(id, "clock", Position::new(0, 0, W as i32, H as i32, 0)) }

    #[test]
    fn test_broken_widget_refuses_to_build() {
        let mut weather = clock("weather");
        weather.kind = "weather".to_string();
        let config = dashboard(vec![clock("clock"), weather]);
        let err = Compositor::new(&config, &ReaderSet::simulated(), Box::new(MemorySink::new(W, H, 1)))
            .err()
            .expect("unknown widget type");
        assert!(matches!(err, DashboardError::Widget { ref id, .. } if id == "weather"), "got {err}");
    }

    #[test]
    fn test_broken_widget_skipped_when_configured() {
        let mut bad_mode = clock("cpu");
        bad_mode.kind = "cpu".to_string();
        bad_mode.mode = Some("sparkline".to_string());
        let mut config = dashboard(vec![clock("clock"), bad_mode]);
        config.skip_broken_widgets = true;
        let compositor = Compositor::new(&config, &ReaderSet::simulated(), Box::new(MemorySink::new(W, H, 1)))
            .expect("broken widget is skipped");
        let engine = compositor.engine();
        let ids: Vec<String> = lock_state(&engine).widgets().iter().map(|w| w.id().to_string()).collect();
        assert_eq!(ids, vec!["clock".to_string()]);
    }

    #[test]
    fn test_demo_layout_builds_and_renders() {
        let config = DashboardConfig::from_yaml_str(include_str!("../dashboard.yaml")).expect("demo layout is valid");
        let sink = MemorySink::new(config.display.width, config.display.height, 1);
        let frames = sink.log();
        let compositor = Compositor::new(&config, &ReaderSet::simulated(), Box::new(sink)).expect("every demo widget builds");
        let engine = compositor.engine();
        assert_eq!(lock_state(&engine).widgets().len(), config.widgets.len());
        lock_state(&engine).render_frame(Instant::now()).expect("sink accepts");
        assert_eq!(frames.delivered(), 1);
    }

    #[test]
    fn test_zero_sized_display_is_rejected() {
        let mut config = dashboard(Vec::new());
        config.display.height = 0;
        let err = Compositor::new(&config, &ReaderSet::new(), Box::new(MemorySink::new(W, H, 1)))
            .err()
            .expect("zero height");
        assert!(matches!(err, DashboardError::Config(ConfigError::Display(_))), "Got {err:?}");
    }

    #[test]
    fn test_missing_reader_is_widget_error() {
        let mut cpu = clock("cpu");
        cpu.kind = "cpu".to_string();
        let err = Compositor::new(&dashboard(vec![cpu]), &ReaderSet::new(), Box::new(MemorySink::new(W, H, 1)))
            .err()
            .expect("no cpu reader");
        assert!(matches!(err, DashboardError::Widget { source: WidgetError::Config(_), .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_stop_lifecycle() {
        let mut media = clock("media");
        media.kind = "media".to_string();
        media.poll_interval_ms = Some(5);
        let config = dashboard(vec![clock("clock"), media]);
        let sink = MemorySink::new(W, H, 2);
        let frames = sink.log();

        let mut compositor =
            Compositor::new(&config, &ReaderSet::simulated(), Box::new(sink)).expect("widgets build");
        assert!(!compositor.is_running());
        assert!(matches!(compositor.stop().await, Err(DashboardError::State(_))), "Stop before start");

        compositor.start().expect("first start");
        assert!(compositor.is_running());
        assert!(matches!(compositor.start(), Err(DashboardError::State(_))), "Double start");

        tokio::time::sleep(Duration::from_millis(100)).await;
        compositor.stop().await.expect("stop while running");
        assert!(!compositor.is_running());
        assert!(frames.delivered() > 0, "Frame loop delivered frames");

        let delivered = frames.delivered();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(frames.delivered(), delivered, "No frames after stop");
        assert!(matches!(compositor.start(), Err(DashboardError::State(_))), "No restart after stop");
    }

    #[tokio::test]
    async fn test_frame_loop_ends_when_sink_goes_away() {
        let config = dashboard(vec![clock("clock")]);
        let mut compositor = Compositor::new(&config, &ReaderSet::simulated(), Box::new(GoneSink)).expect("builds");
        compositor.start().expect("start");
        let result = compositor.finished().await;
        assert!(matches!(result, Err(DashboardError::Sink(SinkError::Unavailable(_)))));
        compositor.stop().await.expect("stop after the loop ended");
    }

    #[tokio::test]
    async fn test_reload_swaps_widgets() {
        let config = dashboard(vec![clock("a")]);
        let mut compositor =
            Compositor::new(&config, &ReaderSet::simulated(), Box::new(MemorySink::new(W, H, 1))).expect("builds");
        compositor.start().expect("start");

        let next = dashboard(vec![clock("b"), clock("c")]);
        compositor.reload(&next, &ReaderSet::simulated()).await.expect("reload");
        let engine = compositor.engine();
        let ids: Vec<String> = lock_state(&engine).widgets().iter().map(|w| w.id().to_string()).collect();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);

        let mut bigger = next.clone();
        bigger.display.width = W * 2;
        assert!(matches!(
            compositor.reload(&bigger, &ReaderSet::simulated()).await,
            Err(DashboardError::State(_))
        ));
        compositor.stop().await.expect("stop");
    }
}
