//! Single-value metric widget (cpu, memory, disk, gpu, volume).

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bitmap::clamp_pct;
use crate::canvas::GrayCanvas;
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::metric::strategy::draw_placeholder;
use crate::metric::{ConfigHelper, DisplayMode, MetricData, MetricRenderer};
use crate::readers::MetricReader;
use crate::ring_buffer::RingBuffer;
use crate::widget::{BaseWidget, Widget, read_state, snapshot, spawn_poller, write_state};

/// Change in percentage points that re-shows an auto-hidden widget.
const AUTO_HIDE_DELTA: f64 = 1.0;

#[derive(Clone, Debug)]
struct MetricState {
    /// Latest good sample in percent.
    value: Option<f64>,
    history: RingBuffer<f64>,
    error: Option<WidgetError>,
}

pub struct MetricWidget {
    base: Arc<BaseWidget>,
    reader: Arc<dyn MetricReader>,
    mode: DisplayMode,
    renderer: MetricRenderer,
    text_format: String,
    placeholder: String,
    /// Sample from a poller instead of `update`.
    poll: Option<Duration>,
    state: Arc<RwLock<MetricState>>,
}

impl MetricWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn MetricReader>,
    ) -> Result<Self, WidgetError> {
        let helper = ConfigHelper::new(config);
        let (mode, renderer) = helper.build()?;
        let placeholder = config.placeholder.clone().unwrap_or_else(|| {
            if config.kind == "gpu" {
                "GPU N/A".to_string()
            } else {
                "N/A".to_string()
            }
        });
        Ok(Self {
            base: Arc::new(BaseWidget::new(config)),
            reader,
            mode,
            renderer,
            text_format: helper.text_format().to_string(),
            placeholder,
            poll: config.poll_interval_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            state: Arc::new(RwLock::new(MetricState {
                value: None,
                history: RingBuffer::new(renderer.graph.history),
                error: None,
            })),
        })
    }

    #[inline]
    pub const fn mode(&self) -> DisplayMode { self.mode }
}

/// Fold one sample into the state. Errors keep the last good value.
fn record(
    state: &RwLock<MetricState>,
    base: &BaseWidget,
    sample: Result<f64, WidgetError>,
) -> Result<(), WidgetError> {
    let mut s = write_state(state);
    match sample {
        Ok(raw) => {
            let value = clamp_pct(raw);
            if s.value.is_none_or(|old| (old - value).abs() >= AUTO_HIDE_DELTA) {
                base.trigger_auto_hide();
            }
            s.value = Some(value);
            s.history.push(value);
            s.error = None;
            Ok(())
        }
        Err(err) => {
            s.error = Some(err.clone());
            Err(err)
        }
    }
}

impl Widget for MetricWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> {
        if self.poll.is_some() {
            return read_state(&self.state).error.clone().map_or(Ok(()), Err);
        }
        record(&self.state, &self.base, self.reader.sample())
    }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let state = snapshot(&self.state);
        let mut canvas = self.base.create_canvas();

        match state.value {
            Some(value) => {
                let history = state.history.to_vec();
                let data = MetricData {
                    value,
                    history: &history,
                    text_format: &self.text_format,
                    content: self.base.content_area(),
                    gauge: self.base.gauge_area(),
                };
                self.renderer.draw(self.mode, &mut canvas, &data);
            }
            None => {
                let inset = self.base.content_area().x;
                draw_placeholder(&mut canvas, &self.placeholder, &self.renderer.text, inset);
            }
        }

        self.base.apply_border(&mut canvas);
        Ok(Some(canvas))
    }

    fn start_pollers(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let Some(period) = self.poll else {
            return Vec::new();
        };
        let state = Arc::clone(&self.state);
        let base = Arc::clone(&self.base);
        let reader = Arc::clone(&self.reader);
        vec![spawn_poller(self.base.id(), period, shutdown, move || {
            record(&state, &base, reader.sample()).ok();
        })]
    }

    fn stop(&self) { self.base.stop_once(|| self.reader.close()); }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::config::Position;
    use crate::readers::UnavailableMetric;
    use crate::widgets::test_support::render_checked;

    /// Replays queued samples, repeating the last one.
    struct Scripted {
        samples: Mutex<VecDeque<Result<f64, WidgetError>>>,
        closed: AtomicUsize,
    }

    impl Scripted {
        fn new(samples: Vec<Result<f64, WidgetError>>) -> Arc<Self> {
            Arc::new(Self {
                samples: Mutex::new(samples.into()),
                closed: AtomicUsize::new(0),
            })
        }
    }

    impl MetricReader for Scripted {
        fn sample(&self) -> Result<f64, WidgetError> {
            let mut q = self.samples.lock().expect("test lock");
            if q.len() > 1 { q.pop_front().expect("non-empty") } else { q.front().cloned().expect("non-empty") }
        }

        fn close(&self) { self.closed.fetch_add(1, Ordering::SeqCst); }
    }

    fn config(
        kind: &str,
        mode: &str,
    ) -> WidgetConfig {
        let mut cfg = WidgetConfig::new(kind, kind, Position::new(0, 0, 40, 12, 0));
        cfg.mode = Some(mode.to_string());
        cfg
    }

    #[test]
    fn test_text_mode_draws_value() {
        let w = MetricWidget::new(&config("cpu", "text"), Scripted::new(vec![Ok(42.0)])).expect("valid");
        w.update().expect("sample ok");
        let c = render_checked(&w).expect("visible");
        assert!(c.count_value(255) > 0, "Text pixels are drawn in the foreground");
    }

    #[test]
    fn test_bar_mode_fills_proportionally() {
        let w = MetricWidget::new(&config("memory", "bar"), Scripted::new(vec![Ok(50.0)])).expect("valid");
        w.update().expect("sample ok");
        let c = render_checked(&w).expect("visible");
        assert_eq!(c.get(10, 6), Some(255));
        assert_eq!(c.get(30, 6), Some(0), "Right half stays empty at 50%");
    }

    #[test]
    fn test_values_are_clamped() {
        let w = MetricWidget::new(&config("cpu", "bar"), Scripted::new(vec![Ok(250.0)])).expect("valid");
        w.update().expect("sample ok");
        assert_eq!(snapshot(&w.state).value, Some(100.0));
    }

    #[test]
    fn test_history_fills_ring() {
        let mut cfg = config("cpu", "graph");
        cfg.graph.history = 3;
        let w = MetricWidget::new(&cfg, Scripted::new(vec![Ok(1.0), Ok(2.0), Ok(3.0), Ok(4.0)])).expect("valid");
        for _ in 0..4 {
            w.update().expect("sample ok");
        }
        assert_eq!(snapshot(&w.state).history.to_vec(), vec![2.0, 3.0, 4.0]);
        render_checked(&w);
    }

    #[test]
    fn test_error_keeps_last_value() {
        let reader = Scripted::new(vec![Ok(30.0), Err(WidgetError::Unavailable("gone".into()))]);
        let w = MetricWidget::new(&config("cpu", "text"), reader).expect("valid");
        w.update().expect("first sample ok");
        assert!(w.update().is_err(), "Failure is reported upward");
        let state = snapshot(&w.state);
        assert_eq!(state.value, Some(30.0), "Stale data is kept");
        assert!(render_checked(&w).is_some(), "Render still succeeds");
    }

    #[test]
    fn test_unavailable_gpu_shows_placeholder() {
        let w = MetricWidget::new(&config("gpu", "gauge"), Arc::new(UnavailableMetric("no counters"))).expect("valid");
        assert!(matches!(w.update(), Err(WidgetError::Unavailable(_))));
        assert_eq!(w.placeholder, "GPU N/A");
        let c = render_checked(&w).expect("visible");
        assert!(c.count_value(255) > 0, "Placeholder text is drawn");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let cfg = config("cpu", "pie");
        assert!(matches!(MetricWidget::new(&cfg, Scripted::new(vec![Ok(1.0)])), Err(WidgetError::Config(_))));
    }

    #[test]
    fn test_auto_hide_shows_on_change_only() {
        let mut cfg = config("volume", "bar");
        cfg.auto_hide.enabled = true;
        cfg.auto_hide.timeout_s = 60.0;
        let w = MetricWidget::new(&cfg, Scripted::new(vec![Ok(40.0)])).expect("valid");
        assert!(render_checked(&w).is_none(), "Hidden before any data");
        w.update().expect("sample ok");
        assert!(render_checked(&w).is_some(), "First sample shows the widget");
    }

    #[test]
    fn test_stop_closes_reader_once() {
        let reader = Scripted::new(vec![Ok(1.0)]);
        let w = MetricWidget::new(&config("cpu", "text"), Arc::clone(&reader) as Arc<dyn MetricReader>).expect("valid");
        w.stop();
        w.stop();
        assert_eq!(reader.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poller_feeds_state() {
        let mut cfg = config("cpu", "text");
        cfg.poll_interval_ms = Some(5);
        let w = MetricWidget::new(&cfg, Scripted::new(vec![Ok(64.0)])).expect("valid");
        let (tx, rx) = watch::channel(false);
        let handles = w.start_pollers(&rx);
        assert_eq!(handles.len(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).expect("poller listening");
        for h in handles {
            h.await.expect("poller exits");
        }
        assert_eq!(snapshot(&w.state).value, Some(64.0));
        assert!(w.update().is_ok(), "update only reports poller errors");
    }

    proptest! {
        #[test]
        fn prop_canvas_matches_position(
            w in 1i32..80,
            h in 1i32..40,
            mode in prop::sample::select(vec!["text", "bar", "graph", "gauge"]),
            value in -50.0f64..150.0,
        ) {
            let mut cfg = WidgetConfig::new("m", "cpu", Position::new(3, 4, w, h, 0));
            cfg.mode = Some(mode.to_string());
            cfg.style.border = Some(200);
            let widget = MetricWidget::new(&cfg, Scripted::new(vec![Ok(value)])).expect("valid");
            widget.update().expect("sample ok");
            let c = widget.render().expect("render ok").expect("visible");
            prop_assert_eq!((c.width() as i32, c.height() as i32), (w, h));
        }
    }
}
