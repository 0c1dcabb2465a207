//! Single-value display strategies.
//!
//! A strategy draws one [`MetricData`] into a canvas in one visual mode.
//! Strategies hold no state; one static instance per mode is shared by every
//! widget and picked with [`strategy_for`].

use std::str::FromStr;

use crate::bitmap::{
    BarDirection, GaugeColors, GraphColors, HAlign, VAlign, draw_aligned_text, draw_gauge, draw_graph,
    draw_horizontal_bar, draw_text_at, draw_vertical_bar, measure_text,
};
use crate::canvas::GrayCanvas;
use crate::error::WidgetError;
use crate::fonts::Font;
use crate::metric::format::format_values;
use crate::widget::ContentArea;

/// Visual mode of a metric widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    #[default]
    Text,
    Bar,
    Graph,
    Gauge,
}

impl FromStr for DisplayMode {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "bar" => Ok(Self::Bar),
            "graph" => Ok(Self::Graph),
            "gauge" => Ok(Self::Gauge),
            other => Err(WidgetError::Config(format!("unknown display mode `{other}`"))),
        }
    }
}

// =============================================================================
// Renderer settings
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub struct TextSettings {
    pub font: Font,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub color: u8,
}

impl TextSettings {
    /// Draw `text` aligned inside `area` of `canvas`.
    pub fn draw_in(
        &self,
        canvas: &mut GrayCanvas,
        text: &str,
        area: ContentArea,
    ) {
        if area.w <= 0 || area.h <= 0 {
            return;
        }
        let (tw, th) = measure_text(text, self.font);
        let x = area.x + self.h_align.offset(area.w, tw);
        let y = area.y + self.v_align.offset(area.h, th);
        draw_text_at(canvas, text, self.font, x, y, Some(area.rect()), self.color);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarSettings {
    pub direction: BarDirection,
    /// Outline color; `None` draws no outline.
    pub border: Option<u8>,
    pub fill: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphSettings {
    pub history: usize,
    pub colors: GraphColors,
}

/// Everything a strategy needs besides the data.
#[derive(Clone, Copy, Debug)]
pub struct MetricRenderer {
    pub text: TextSettings,
    pub bar: BarSettings,
    pub graph: GraphSettings,
    pub gauge: GaugeColors,
}

impl MetricRenderer {
    /// Draw `data` with the strategy for `mode`.
    pub fn draw(
        &self,
        mode: DisplayMode,
        canvas: &mut GrayCanvas,
        data: &MetricData<'_>,
    ) {
        strategy_for(mode).render(canvas, self, data);
    }
}

/// Inputs for one draw.
#[derive(Clone, Copy, Debug)]
pub struct MetricData<'a> {
    /// Current value in percent.
    pub value: f64,
    /// Oldest-first history in percent.
    pub history: &'a [f64],
    pub text_format: &'a str,
    pub content: ContentArea,
    pub gauge: ContentArea,
}

// =============================================================================
// Strategies
// =============================================================================

pub trait DisplayStrategy: Sync {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &MetricRenderer,
        data: &MetricData<'_>,
    );
}

pub struct TextStrategy;
pub struct BarStrategy;
pub struct GraphStrategy;
pub struct GaugeStrategy;

static TEXT: TextStrategy = TextStrategy;
static BAR: BarStrategy = BarStrategy;
static GRAPH: GraphStrategy = GraphStrategy;
static GAUGE: GaugeStrategy = GaugeStrategy;

/// Shared strategy instance for `mode`.
pub fn strategy_for(mode: DisplayMode) -> &'static dyn DisplayStrategy {
    match mode {
        DisplayMode::Text => &TEXT,
        DisplayMode::Bar => &BAR,
        DisplayMode::Graph => &GRAPH,
        DisplayMode::Gauge => &GAUGE,
    }
}

impl DisplayStrategy for TextStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &MetricRenderer,
        data: &MetricData<'_>,
    ) {
        let text = format_values(data.text_format, &[data.value]);
        renderer.text.draw_in(canvas, &text, data.content);
    }
}

impl DisplayStrategy for BarStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &MetricRenderer,
        data: &MetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.content;
        let bar = renderer.bar;
        match bar.direction {
            BarDirection::Horizontal => draw_horizontal_bar(canvas, x, y, w, h, data.value, bar.fill, bar.border),
            BarDirection::Vertical => draw_vertical_bar(canvas, x, y, w, h, data.value, bar.fill, bar.border),
        }
    }
}

impl DisplayStrategy for GraphStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &MetricRenderer,
        data: &MetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.content;
        draw_graph(canvas, x, y, w, h, data.history, renderer.graph.history, renderer.graph.colors);
    }
}

impl DisplayStrategy for GaugeStrategy {
    fn render(
        &self,
        canvas: &mut GrayCanvas,
        renderer: &MetricRenderer,
        data: &MetricData<'_>,
    ) {
        let ContentArea { x, y, w, h } = data.gauge;
        draw_gauge(canvas, x, y, w, h, data.value, renderer.gauge);
    }
}

/// Aligned text over the whole canvas, used for placeholders.
pub fn draw_placeholder(
    canvas: &mut GrayCanvas,
    text: &str,
    settings: &TextSettings,
    padding: i32,
) {
    draw_aligned_text(canvas, text, settings.font, settings.h_align, settings.v_align, padding, settings.color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts;

    fn renderer() -> MetricRenderer {
        MetricRenderer {
            text: TextSettings {
                font: fonts::resolve(10, None),
                h_align: HAlign::Center,
                v_align: VAlign::Center,
                color: 255,
            },
            bar: BarSettings {
                direction: BarDirection::Horizontal,
                border: None,
                fill: 255,
            },
            graph: GraphSettings {
                history: 5,
                colors: GraphColors::new(None, 255),
            },
            gauge: GaugeColors {
                arc: 200,
                needle: 255,
                ticks: Some(150),
            },
        }
    }

    fn area(
        w: i32,
        h: i32,
    ) -> ContentArea {
        ContentArea { x: 0, y: 0, w, h }
    }

    fn data(
        value: f64,
        history: &[f64],
    ) -> MetricData<'_> {
        MetricData {
            value,
            history,
            text_format: "%.0f",
            content: area(64, 20),
            gauge: area(64, 20),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("gauge".parse::<DisplayMode>(), Ok(DisplayMode::Gauge));
        assert!(matches!("pie".parse::<DisplayMode>(), Err(WidgetError::Config(_))));
        assert_eq!(DisplayMode::default(), DisplayMode::Text);
    }

    #[test]
    fn test_bar_strategy_fills_content() {
        let mut c = GrayCanvas::new(64, 20);
        renderer().draw(DisplayMode::Bar, &mut c, &data(100.0, &[]));
        assert_eq!(c.count_value(255), 62 * 18, "Full bar fills the content interior");
        assert_eq!(c.get(0, 0), Some(0), "Bar ring stays clear without a border");
        let mut c = GrayCanvas::new(64, 20);
        renderer().draw(DisplayMode::Bar, &mut c, &data(0.0, &[]));
        assert_eq!(c.count_value(255), 0);
    }

    #[test]
    fn test_vertical_bar_strategy() {
        let mut r = renderer();
        r.bar.direction = BarDirection::Vertical;
        let mut c = GrayCanvas::new(64, 20);
        r.draw(DisplayMode::Bar, &mut c, &data(50.0, &[]));
        assert_eq!(c.get(1, 18), Some(255), "Fill starts at the bottom interior row");
        assert_eq!(c.get(1, 1), Some(0));
        assert_eq!(c.get(1, 19), Some(0), "Bottom ring row stays clear");
    }

    #[test]
    fn test_graph_strategy_uses_history() {
        let mut c = GrayCanvas::new(64, 20);
        renderer().draw(DisplayMode::Graph, &mut c, &data(0.0, &[50.0; 5]));
        assert_eq!(c.get(0, 9), Some(255), "Plateau row is bottom - round(0.5 * 19)");
    }

    #[test]
    fn test_text_strategy_centers_formatted_value() {
        let r = renderer();
        let mut c = GrayCanvas::new(64, 20);
        r.draw(DisplayMode::Text, &mut c, &data(42.0, &[]));

        let content = area(64, 20);
        let (tw, th) = measure_text("42", r.text.font);
        let x = HAlign::Center.offset(content.w, tw);
        let y = VAlign::Center.offset(content.h, th);
        let mut expected = GrayCanvas::new(64, 20);
        draw_text_at(&mut expected, "42", r.text.font, x, y, Some(content.rect()), 255);

        assert!(expected.count_value(255) > 0);
        assert_eq!(c, expected, "Text mode draws \"42\" centered in the content area");
    }

    #[test]
    fn test_gauge_strategy_uses_gauge_rect() {
        let mut c = GrayCanvas::new(64, 20);
        let mut d = data(50.0, &[]);
        d.gauge = area(32, 20);
        renderer().draw(DisplayMode::Gauge, &mut c, &d);
        for y in 0..20 {
            for x in 32..64 {
                assert_eq!(c.get(x, y), Some(0), "Gauge stays inside its rect at ({x}, {y})");
            }
        }
        assert!(c.count_value(200) > 0);
    }

    #[test]
    fn test_strategies_are_shared() {
        let a = strategy_for(DisplayMode::Bar) as *const dyn DisplayStrategy as *const ();
        let b = strategy_for(DisplayMode::Bar) as *const dyn DisplayStrategy as *const ();
        assert_eq!(a, b, "Same static instance for the same mode");
    }
}
