//! Two-value renderer for I/O widgets (download/upload, read/write).
//!
//! Values arrive in source units (bytes per second). They are normalised to
//! percent at draw time against `max_value`, or auto-scaled when
//! `max_value <= 0`:
//!
//! - current values: `scale = max(primary, secondary, 1)`
//! - histories: `scale = max(1, max over both histories)`

use crate::bitmap::{
    BarDirection, GaugeColors, GraphColors, clamp_pct, draw_dual_gauge, draw_dual_graph, draw_dual_horizontal_bar,
    draw_dual_vertical_bar,
};
use crate::canvas::{GrayCanvas, color_opt};
use crate::config::{Colors, WidgetConfig};
use crate::config::constants::{DUAL_TEXT_FORMAT, FOREGROUND, GAUGE_ARC, GAUGE_NEEDLE, GAUGE_TICKS, SECONDARY_FOREGROUND};
use crate::error::WidgetError;
use crate::metric::builder::{ConfigHelper, color_or};
use crate::metric::format::format_values_with_suffixes;
use crate::metric::strategy::{DisplayMode, TextSettings};
use crate::metric::units::RateUnit;
use crate::widget::ContentArea;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DualBarSettings {
    pub direction: BarDirection,
    pub border: Option<u8>,
    pub primary: u8,
    pub secondary: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DualGraphSettings {
    pub history: usize,
    pub primary: GraphColors,
    pub secondary: GraphColors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DualGaugeSettings {
    pub primary: GaugeColors,
    pub secondary: GaugeColors,
}

/// Settings for every dual mode.
#[derive(Clone, Debug)]
pub struct DualMetricRenderer {
    pub text: TextSettings,
    pub text_format: String,
    pub unit: RateUnit,
    pub show_unit: bool,
    pub bar: DualBarSettings,
    pub graph: DualGraphSettings,
    pub gauge: DualGaugeSettings,
    /// Full scale in source units; `<= 0` auto-scales.
    pub max_value: f64,
}

/// Inputs for one draw, in source units.
#[derive(Clone, Copy, Debug)]
pub struct DualMetricData<'a> {
    pub primary: f64,
    pub secondary: f64,
    pub primary_history: &'a [f64],
    pub secondary_history: &'a [f64],
    pub content: ContentArea,
    pub gauge: ContentArea,
}

impl DualMetricRenderer {
    /// Build from config. Network widgets read `rx`/`tx` colors, disk I/O
    /// widgets `read`/`write`.
    pub fn from_config(config: &WidgetConfig) -> Result<(DisplayMode, Self), WidgetError> {
        let helper = ConfigHelper::new(config);
        let mode = helper.display_mode()?;
        let unit = config
            .unit
            .parse()
            .map_err(|_| WidgetError::Config(format!("{}: unknown unit `{}`", config.id, config.unit)))?;

        let pick = |colors: &Colors| {
            (
                color_or(colors.rx.or(colors.read).or(colors.fill), FOREGROUND),
                color_or(colors.tx.or(colors.write).or(colors.fill), SECONDARY_FOREGROUND),
            )
        };

        let (bar_p, bar_s) = pick(&config.bar.colors);
        let (line_p, line_s) = pick(&config.graph.colors);
        let graph_fill = config.graph.colors.fill.and_then(color_opt);
        let gauge_colors = &config.gauge.colors;
        let arc = color_or(gauge_colors.arc, GAUGE_ARC);
        let ticks = config
            .gauge
            .show_ticks
            .then(|| color_or(gauge_colors.ticks, GAUGE_TICKS));
        let needle = gauge_colors.needle;

        let renderer = Self {
            text: helper.text(),
            text_format: config
                .text
                .format
                .clone()
                .unwrap_or_else(|| DUAL_TEXT_FORMAT.to_string()),
            unit,
            show_unit: config.show_unit,
            bar: DualBarSettings {
                direction: config.bar.direction,
                border: config.bar.border.then_some(bar_p),
                primary: bar_p,
                secondary: bar_s,
            },
            graph: DualGraphSettings {
                history: config.graph.history.max(1),
                primary: GraphColors::new(graph_fill, line_p),
                secondary: GraphColors::new(graph_fill, line_s),
            },
            gauge: DualGaugeSettings {
                primary: GaugeColors {
                    arc,
                    needle: color_or(gauge_colors.rx_needle.or(needle), GAUGE_NEEDLE),
                    ticks,
                },
                secondary: GaugeColors {
                    arc,
                    needle: color_or(gauge_colors.tx_needle.or(needle), GAUGE_NEEDLE),
                    ticks: None,
                },
            },
            max_value: config.effective_max(),
        };
        Ok((mode, renderer))
    }

    #[inline]
    pub fn auto_scaled(&self) -> bool { self.max_value <= 0.0 }

    /// Current values as percentages.
    pub fn current_pcts(
        &self,
        primary: f64,
        secondary: f64,
    ) -> (f64, f64) {
        let scale = if self.auto_scaled() {
            primary.max(secondary).max(1.0)
        } else {
            self.max_value
        };
        (to_pct(primary, scale), to_pct(secondary, scale))
    }

    /// Both histories as percentages against one shared scale.
    pub fn history_pcts(
        &self,
        primary: &[f64],
        secondary: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        let scale = if self.auto_scaled() {
            primary
                .iter()
                .chain(secondary)
                .copied()
                .fold(1.0, f64::max)
        } else {
            self.max_value
        };
        (
            primary.iter().map(|&v| to_pct(v, scale)).collect(),
            secondary.iter().map(|&v| to_pct(v, scale)).collect(),
        )
    }

    /// Text for the current values, with unit suffixes when enabled.
    pub fn format_text(
        &self,
        primary: f64,
        secondary: f64,
    ) -> String {
        let (p, pu) = self.unit.convert(primary);
        let (s, su) = self.unit.convert(secondary);
        if self.show_unit {
            format_values_with_suffixes(&self.text_format, &[p, s], &[pu.suffix(), su.suffix()])
        } else {
            format_values_with_suffixes(&self.text_format, &[p, s], &[])
        }
    }

    pub fn draw(
        &self,
        mode: DisplayMode,
        canvas: &mut GrayCanvas,
        data: &DualMetricData<'_>,
    ) {
        dual_strategy_for(mode).render(canvas, self, data);
    }
}

#[inline]
fn to_pct(
    v: f64,
    scale: f64,
) -> f64 {
    clamp_pct(v / scale * 100.0)
}

// =============================================================================
// Strategies
// =============================================================================

pub trait DualDisplayStrategy: Sync {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &DualMetricRenderer,
        data: &DualMetricData<'_>,
    );
}

pub struct DualTextStrategy;
pub struct DualBarStrategy;
pub struct DualGraphStrategy;
pub struct DualGaugeStrategy;

static DUAL_TEXT: DualTextStrategy = DualTextStrategy;
static DUAL_BAR: DualBarStrategy = DualBarStrategy;
static DUAL_GRAPH: DualGraphStrategy = DualGraphStrategy;
static DUAL_GAUGE: DualGaugeStrategy = DualGaugeStrategy;

pub fn dual_strategy_for(mode: DisplayMode) -> &'static dyn DualDisplayStrategy {
    match mode {
        DisplayMode::Text => &DUAL_TEXT,
        DisplayMode::Bar => &DUAL_BAR,
        DisplayMode::Graph => &DUAL_GRAPH,
        DisplayMode::Gauge => &DUAL_GAUGE,
    }
}

impl DualDisplayStrategy for DualTextStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &DualMetricRenderer,
        data: &DualMetricData<'_>,
    ) {
        let text = renderer.format_text(data.primary, data.secondary);
        renderer.text.draw_in(canvas, &text, data.content);
    }
}

impl DualDisplayStrategy for DualBarStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &DualMetricRenderer,
        data: &DualMetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.content;
        let (p, s) = renderer.current_pcts(data.primary, data.secondary);
        let bar = renderer.bar;
        match bar.direction {
            BarDirection::Horizontal => {
                draw_dual_horizontal_bar(canvas, x, y, w, h, p, s, bar.primary, bar.secondary, bar.border);
            }
            BarDirection::Vertical => {
                draw_dual_vertical_bar(canvas, x, y, w, h, p, s, bar.primary, bar.secondary, bar.border);
            }
        }
    }
}

impl DualDisplayStrategy for DualGraphStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &DualMetricRenderer,
        data: &DualMetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.content;
        let (p, s) = renderer.history_pcts(data.primary_history, data.secondary_history);
        let graph = renderer.graph;
        draw_dual_graph(canvas, x, y, w, h, &p, &s, graph.history, graph.primary, graph.secondary);
    }
}

impl DualDisplayStrategy for DualGaugeStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &DualMetricRenderer,
        data: &DualMetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.gauge;
        let (p, s) = renderer.current_pcts(data.primary, data.secondary);
        draw_dual_gauge(canvas, x, y, w, h, p, s, renderer.gauge.primary, renderer.gauge.secondary);
    }
}
