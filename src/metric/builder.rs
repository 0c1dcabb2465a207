//! Turns a [`WidgetConfig`] into a ready [`MetricRenderer`] plus display mode.

use crate::bitmap::{GaugeColors, GraphColors};
use crate::canvas::color_opt;
use crate::config::WidgetConfig;
use crate::config::constants::{FOREGROUND, GAUGE_ARC, GAUGE_NEEDLE, GAUGE_TICKS, TEXT_FORMAT};
use crate::error::WidgetError;
use crate::fonts;
use crate::metric::strategy::{BarSettings, DisplayMode, GraphSettings, MetricRenderer, TextSettings};

/// Resolves renderer settings from a widget config, filling in defaults.
#[derive(Clone, Copy, Debug)]
pub struct ConfigHelper<'a> {
    config: &'a WidgetConfig,
}

impl<'a> ConfigHelper<'a> {
    pub const fn new(config: &'a WidgetConfig) -> Self { Self { config } }

    /// Parsed display mode; absent means text.
    pub fn display_mode(&self) -> Result<DisplayMode, WidgetError> {
        match self.config.mode.as_deref() {
            None => Ok(DisplayMode::Text),
            Some(mode) => mode
                .parse()
                .map_err(|_| WidgetError::Config(format!("{}: unknown display mode `{mode}`", self.config.id))),
        }
    }

    /// Numeric text format, `"%.0f"` unless configured.
    pub fn text_format(&self) -> &'a str { self.config.text.format.as_deref().unwrap_or(TEXT_FORMAT) }

    pub fn text(&self) -> TextSettings {
        let text = &self.config.text;
        TextSettings {
            font: fonts::resolve(text.size, text.font.as_deref()),
            h_align: text.align.h,
            v_align: text.align.v,
            color: FOREGROUND,
        }
    }

    pub fn bar(&self) -> BarSettings {
        let bar = &self.config.bar;
        let fill = color_or(bar.colors.fill, FOREGROUND);
        BarSettings {
            direction: bar.direction,
            border: bar.border.then_some(fill),
            fill,
        }
    }

    pub fn graph(&self) -> GraphSettings {
        let colors = &self.config.graph.colors;
        GraphSettings {
            history: self.config.graph.history.max(1),
            colors: GraphColors::new(fill_or(colors.fill, FOREGROUND), color_or(colors.line, FOREGROUND)),
        }
    }

    pub fn gauge(&self) -> GaugeColors {
        let gauge = &self.config.gauge;
        GaugeColors {
            arc: color_or(gauge.colors.arc, GAUGE_ARC),
            needle: color_or(gauge.colors.needle, GAUGE_NEEDLE),
            ticks: gauge
                .show_ticks
                .then(|| color_or(gauge.colors.ticks, GAUGE_TICKS)),
        }
    }

    /// Full renderer and mode for a single-value widget.
    pub fn build(&self) -> Result<(DisplayMode, MetricRenderer), WidgetError> {
        let mode = self.display_mode()?;
        let renderer = MetricRenderer {
            text: self.text(),
            bar: self.bar(),
            graph: self.graph(),
            gauge: self.gauge(),
        };
        Ok((mode, renderer))
    }
}

/// Configured color, or `default` when absent or out of range.
pub(crate) fn color_or(
    value: Option<i32>,
    default: u8,
) -> u8 {
    value.and_then(color_opt).unwrap_or(default)
}

/// Like [`color_or`], but an explicit `-1` turns the fill off.
pub(crate) fn fill_or(
    value: Option<i32>,
    default: u8,
) -> Option<u8> {
    match value {
        None => Some(default),
        Some(v) => color_opt(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{BarDirection, HAlign, VAlign};
    use crate::config::Position;

    fn config() -> WidgetConfig { WidgetConfig::new("cpu", "cpu", Position::new(0, 0, 64, 20, 0)) }

    #[test]
    fn test_defaults() {
        let cfg = config();
        let (mode, r) = ConfigHelper::new(&cfg).build().expect("defaults are valid");
        assert_eq!(mode, DisplayMode::Text);
        assert_eq!(r.text.h_align, HAlign::Center);
        assert_eq!(r.text.v_align, VAlign::Center);
        assert_eq!(r.text.font.character_size.height, 10, "Size 10 picks the 6x10 face");
        assert_eq!(r.bar.direction, BarDirection::Horizontal);
        assert_eq!(r.bar.border, None);
        assert_eq!(r.bar.fill, 255);
        assert_eq!(r.gauge, GaugeColors { arc: 200, needle: 255, ticks: Some(150) });
        assert_eq!(r.graph.history, 30);
        assert_eq!(r.graph.colors, GraphColors::new(Some(255), 255));
        assert_eq!(ConfigHelper::new(&cfg).text_format(), "%.0f");
    }

    #[test]
    fn test_overrides() {
        let mut cfg = config();
        cfg.mode = Some("gauge".into());
        cfg.gauge.show_ticks = false;
        cfg.gauge.colors.arc = Some(90);
        cfg.graph.colors.fill = Some(-1);
        cfg.bar.border = true;
        cfg.bar.colors.fill = Some(180);
        cfg.text.format = Some("%.1f%%".into());

        let helper = ConfigHelper::new(&cfg);
        let (mode, r) = helper.build().expect("valid overrides");
        assert_eq!(mode, DisplayMode::Gauge);
        assert_eq!(r.gauge.ticks, None, "Ticks hidden");
        assert_eq!(r.gauge.arc, 90);
        assert_eq!(r.graph.colors.fill, None, "-1 disables the fill");
        assert_eq!(r.bar.border, Some(180), "Bar outline uses the fill color");
        assert_eq!(helper.text_format(), "%.1f%%");
    }

    #[test]
    fn test_unknown_mode_is_config_error() {
        let mut cfg = config();
        cfg.mode = Some("sparkline".into());
        assert!(matches!(ConfigHelper::new(&cfg).build(), Err(WidgetError::Config(_))));
    }
}
