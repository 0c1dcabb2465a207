//! Two-value I/O widget (network rx/tx, disk read/write).

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::canvas::GrayCanvas;
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::metric::strategy::draw_placeholder;
use crate::metric::{DisplayMode, DualMetricData, DualMetricRenderer};
use crate::readers::DualMetricReader;
use crate::ring_buffer::RingBuffer;
use crate::widget::{BaseWidget, Widget, read_state, snapshot, spawn_poller, write_state};

#[derive(Clone, Debug)]
struct DualState {
    /// Latest good sample in source units.
    current: Option<(f64, f64)>,
    primary: RingBuffer<f64>,
    secondary: RingBuffer<f64>,
    error: Option<WidgetError>,
}

pub struct DualMetricWidget {
    base: Arc<BaseWidget>,
    reader: Arc<dyn DualMetricReader>,
    mode: DisplayMode,
    renderer: DualMetricRenderer,
    placeholder: String,
    poll: Option<Duration>,
    state: Arc<RwLock<DualState>>,
}

impl DualMetricWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn DualMetricReader>,
    ) -> Result<Self, WidgetError> {
        let (mode, renderer) = DualMetricRenderer::from_config(config)?;
        let history = renderer.graph.history;
        Ok(Self {
            base: Arc::new(BaseWidget::new(config)),
            reader,
            mode,
            renderer,
            placeholder: config.placeholder.clone().unwrap_or_else(|| "N/A".to_string()),
            poll: config.poll_interval_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            state: Arc::new(RwLock::new(DualState {
                current: None,
                primary: RingBuffer::new(history),
                secondary: RingBuffer::new(history),
                error: None,
            })),
        })
    }
}

fn record(
    state: &RwLock<DualState>,
    base: &BaseWidget,
    sample: Result<(f64, f64), WidgetError>,
) -> Result<(), WidgetError> {
    let mut s = write_state(state);
    match sample {
        Ok((p, s_val)) => {
            let (p, s_val) = (finite_rate(p), finite_rate(s_val));
            if s.current.is_none_or(|old| old != (p, s_val)) {
                base.trigger_auto_hide();
            }
            s.current = Some((p, s_val));
            s.primary.push(p);
            s.secondary.push(s_val);
            s.error = None;
            Ok(())
        }
        Err(err) => {
            s.error = Some(err.clone());
            Err(err)
        }
    }
}

/// Rates are non-negative; NaN counts as idle.
#[inline]
fn finite_rate(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl Widget for DualMetricWidget {
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

        match state.current {
            Some((primary, secondary)) => {
                let (ph, sh) = (state.primary.to_vec(), state.secondary.to_vec());
                let data = DualMetricData {
                    primary,
                    secondary,
                    primary_history: &ph,
                    secondary_history: &sh,
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
