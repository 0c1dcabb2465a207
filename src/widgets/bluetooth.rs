//! Connected Bluetooth device with battery level.
//!
//! Tokens: `{icon}`, `{name}`, `{level}` (battery percent), `{state}`, and
//! the shapes `{battery:N}`, `{battery_v:N}`, `{bar:N}`, `{bar_v:N}`. While
//! the battery is at or below `battery.low_pct` the blink target (first
//! shape, else the icon, else `{name}`) flashes.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::animation::BlinkAnimator;
use crate::canvas::GrayCanvas;
use crate::composite::{CompositeRenderer, ShapeKind, TokenSource, blink_target, classify_with};
use crate::config::WidgetConfig;
use crate::config::constants::BLUETOOTH_POLL_INTERVAL;
use crate::error::WidgetError;
use crate::icons::IconKind;
use crate::metric::strategy::draw_placeholder;
use crate::metric::{ConfigHelper, TextSettings};
use crate::readers::{BluetoothDevice, BluetoothReader};
use crate::tokens::{Token, parse_format_tokens};
use crate::widget::{BaseWidget, Widget, lock_state, read_state, snapshot, spawn_poller, write_state};
use crate::widgets::{composite_renderer, draw_composite_line, poll_period};

const TEXT_TOKENS: [&str; 3] = ["name", "level", "state"];
const DEFAULT_FORMAT: &str = "{icon}{name} {battery:16}";

#[derive(Clone, Debug, Default)]
struct BluetoothState {
    device: Option<BluetoothDevice>,
    error: Option<WidgetError>,
}

pub struct BluetoothWidget {
    base: Arc<BaseWidget>,
    reader: Arc<dyn BluetoothReader>,
    tokens: Vec<Token>,
    /// Token hidden during the off phase of a low-battery blink.
    blink_slot: Option<usize>,
    renderer: CompositeRenderer,
    text: TextSettings,
    blink: Option<Mutex<BlinkAnimator>>,
    low_pct: f64,
    placeholder: String,
    period: Duration,
    state: Arc<RwLock<BluetoothState>>,
}

impl BluetoothWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn BluetoothReader>,
    ) -> Self {
        let format = config.text.format.as_deref().unwrap_or(DEFAULT_FORMAT);
        let tokens = parse_format_tokens(format, classify_with(&TEXT_TOKENS));
        Self {
            base: Arc::new(BaseWidget::new(config)),
            reader,
            blink_slot: blink_target(&tokens),
            tokens,
            renderer: composite_renderer(config),
            text: ConfigHelper::new(config).text(),
            blink: config
                .blink
                .enabled
                .then(|| Mutex::new(BlinkAnimator::from_config(&config.blink))),
            low_pct: config.battery.low_pct,
            placeholder: config.placeholder.clone().unwrap_or_else(|| "No device".to_string()),
            period: poll_period(config, BLUETOOTH_POLL_INTERVAL),
            state: Arc::new(RwLock::new(BluetoothState::default())),
        }
    }

    fn is_low(
        &self,
        device: &BluetoothDevice,
    ) -> bool {
        device.connected && device.battery.is_some_and(|b| b <= self.low_pct)
    }
}

/// First connected device, else the first known one.
fn pick_device(devices: Vec<BluetoothDevice>) -> Option<BluetoothDevice> {
    let connected = devices.iter().position(|d| d.connected);
    devices.into_iter().nth(connected.unwrap_or(0))
}

/// Store a poll result; a change in connection state re-shows the widget.
fn record(
    state: &RwLock<BluetoothState>,
    base: &BaseWidget,
    result: Result<Vec<BluetoothDevice>, WidgetError>,
) {
    let mut s = write_state(state);
    match result {
        Ok(devices) => {
            let device = pick_device(devices);
            let was = s.device.as_ref().map(|d| (d.name.clone(), d.connected));
            let now = device.as_ref().map(|d| (d.name.clone(), d.connected));
            if was != now {
                base.trigger_auto_hide();
            }
            s.device = device;
            s.error = None;
        }
        Err(err) => s.error = Some(err),
    }
}

struct DeviceTokens<'a> {
    device: &'a BluetoothDevice,
}

impl TokenSource for DeviceTokens<'_> {
    fn text(
        &self,
        name: &str,
        _param: Option<&str>,
    ) -> String {
        match name {
            "name" => self.device.name.clone(),
            "level" => self
                .device
                .battery
                .map(|b| format!("{:.0}%", b.clamp(0.0, 100.0)))
                .unwrap_or_default(),
            "state" => String::from(if self.device.connected { "connected" } else { "disconnected" }),
            _ => String::new(),
        }
    }

    fn icon(
        &self,
        _name: &str,
    ) -> Option<IconKind> {
        Some(if self.device.connected {
            IconKind::Bluetooth
        } else {
            IconKind::BluetoothOff
        })
    }

    fn level(
        &self,
        _shape: ShapeKind,
    ) -> Option<f64> {
        self.device.battery
    }
}

impl Widget for BluetoothWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> { read_state(&self.state).error.clone().map_or(Ok(()), Err) }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let state = snapshot(&self.state);
        let mut canvas = self.base.create_canvas();
        let area = self.base.content_area();

        match &state.device {
            Some(device) => {
                let hidden = self.blink.as_ref().and_then(|blink| {
                    let mut blink = lock_state(blink);
                    blink.set_condition(self.is_low(device));
                    blink.tick(Instant::now());
                    if blink.should_render() { None } else { self.blink_slot }
                });
                let layout = self.renderer.layout(&self.tokens, &DeviceTokens { device }, area);
                draw_composite_line(&mut canvas, &self.renderer, &layout, area, None, hidden, Instant::now());
            }
            None => draw_placeholder(&mut canvas, &self.placeholder, &self.text, area.x),
        }

        self.base.apply_border(&mut canvas);
        Ok(Some(canvas))
    }

    fn start_pollers(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let state = Arc::clone(&self.state);
        let base = Arc::clone(&self.base);
        let reader = Arc::clone(&self.reader);
        vec![spawn_poller(self.base.id(), self.period, shutdown, move || {
            record(&state, &base, reader.devices());
        })]
    }
}
