//! Concrete widget kinds and the factory that builds them from config.
//!
//! | Type | Widget | Data |
//! |------|--------|------|
//! | `clock` | [`ClockWidget`] | local time via `chrono` |
//! | `cpu`, `memory`, `disk`, `gpu`, `volume` | [`MetricWidget`] | [`MetricReader`](crate::readers::MetricReader), sampled in `update` |
//! | `network`, `disk_io` | [`DualMetricWidget`] | [`DualMetricReader`](crate::readers::DualMetricReader) |
//! | `keyboard` | [`KeyboardWidget`] | lock state, composite tokens |
//! | `bluetooth` | [`BluetoothWidget`] | poller, composite tokens |
//! | `media` / `beefweb` | [`MediaWidget`] | poller, composite tokens |
//! | `clipboard` | [`ClipboardWidget`] | poller, formatted preview |
//! | `activity` | [`ActivityWidget`] | idle time, sleepy sprite |
//!
//! Widgets with a poller publish into shared state from a blocking task;
//! the others sample inside `update`, which the compositor calls right
//! before `render`.

mod activity;
mod bluetooth;
mod clipboard;
mod clock;
mod dual_metric;
mod keyboard;
mod media;
mod metric;

use std::time::{Duration, Instant};

pub use activity::ActivityWidget;
pub use bluetooth::BluetoothWidget;
pub use clipboard::ClipboardWidget;
pub use clock::ClockWidget;
pub use dual_metric::DualMetricWidget;
pub use keyboard::KeyboardWidget;
pub use media::MediaWidget;
pub use metric::MetricWidget;

use crate::animation::ScrollAnimator;
use crate::bitmap::{draw_text_at, measure_text};
use crate::canvas::GrayCanvas;
use crate::composite::{CompositeRenderer, Layout};
use crate::config::WidgetConfig;
use crate::config::constants::FOREGROUND;
use crate::error::WidgetError;
use crate::metric::{ConfigHelper, TextSettings};
use crate::readers::ReaderSet;
use crate::widget::{ContentArea, Widget};

/// Build the widget for `config.kind` with its reader from `readers`.
pub fn build_widget(
    config: &WidgetConfig,
    readers: &ReaderSet,
) -> Result<Box<dyn Widget>, WidgetError> {
    let widget: Box<dyn Widget> = match config.kind.as_str() {
        "clock" => Box::new(ClockWidget::new(config)?),
        "cpu" | "memory" | "disk" | "gpu" | "volume" => {
            let reader = readers
                .metric(&config.kind)
                .ok_or_else(|| missing_reader(config))?;
            Box::new(MetricWidget::new(config, reader)?)
        }
        "network" | "disk_io" => {
            let reader = readers
                .dual(&config.kind)
                .ok_or_else(|| missing_reader(config))?;
            Box::new(DualMetricWidget::new(config, reader)?)
        }
        "keyboard" => {
            let reader = readers.keyboard.clone().ok_or_else(|| missing_reader(config))?;
            Box::new(KeyboardWidget::new(config, reader))
        }
        "bluetooth" => {
            let reader = readers.bluetooth.clone().ok_or_else(|| missing_reader(config))?;
            Box::new(BluetoothWidget::new(config, reader))
        }
        "media" | "beefweb" => {
            let reader = readers.media.clone().ok_or_else(|| missing_reader(config))?;
            Box::new(MediaWidget::new(config, reader))
        }
        "clipboard" => {
            let reader = readers.clipboard.clone().ok_or_else(|| missing_reader(config))?;
            Box::new(ClipboardWidget::new(config, reader))
        }
        "activity" => {
            let reader = readers.activity.clone().ok_or_else(|| missing_reader(config))?;
            Box::new(ActivityWidget::new(config, reader))
        }
        other => return Err(WidgetError::Config(format!("{}: unknown widget type `{other}`", config.id))),
    };
    Ok(widget)
}

fn missing_reader(config: &WidgetConfig) -> WidgetError {
    WidgetError::Config(format!("{}: no data source for `{}`", config.id, config.kind))
}

/// Poll period from config, or `default`.
fn poll_period(
    config: &WidgetConfig,
    default: Duration,
) -> Duration {
    config
        .poll_interval_ms
        .filter(|ms| *ms > 0)
        .map_or(default, Duration::from_millis)
}

/// Composite renderer configured from the widget's text and battery blocks.
fn composite_renderer(config: &WidgetConfig) -> CompositeRenderer {
    let text = ConfigHelper::new(config).text();
    CompositeRenderer {
        font: text.font,
        h_align: text.h_align,
        v_align: text.v_align,
        color: FOREGROUND,
        battery_padding: config.battery.padding,
    }
}

/// Draw `text` in `area`, scrolling it when it overflows.
fn draw_scrolling_text(
    canvas: &mut GrayCanvas,
    text: &str,
    settings: &TextSettings,
    area: ContentArea,
    scroll: Option<&mut ScrollAnimator>,
    now: Instant,
) {
    let Some(scroll) = scroll else {
        settings.draw_in(canvas, text, area);
        return;
    };
    let (tw, th) = measure_text(text, settings.font);
    let horizontal = scroll.direction().is_horizontal();
    if horizontal {
        scroll.set_extent(tw, area.w);
    } else {
        scroll.set_extent(th, area.h);
    }
    scroll.tick(now);
    if !scroll.needs_scroll() {
        settings.draw_in(canvas, text, area);
        return;
    }

    let clip = Some(area.rect());
    if horizontal {
        let y = area.y + settings.v_align.offset(area.h, th);
        let (first, second) = scroll.positions(area.x);
        for x in std::iter::once(first).chain(second) {
            draw_text_at(canvas, text, settings.font, x, y, clip, settings.color);
        }
    } else {
        let x = area.x + settings.h_align.offset(area.w, tw);
        let (first, second) = scroll.positions(area.y);
        for y in std::iter::once(first).chain(second) {
            draw_text_at(canvas, text, settings.font, x, y, clip, settings.color);
        }
    }
}

/// Draw a composite line, scrolling it horizontally when it overflows.
fn draw_composite_line(
    canvas: &mut GrayCanvas,
    renderer: &CompositeRenderer,
    layout: &Layout,
    area: ContentArea,
    scroll: Option<&mut ScrollAnimator>,
    hidden: Option<usize>,
    now: Instant,
) {
    match scroll {
        Some(scroll) if scroll.direction().is_horizontal() => {
            scroll.set_extent(layout.total_width, area.w);
            scroll.tick(now);
            if scroll.needs_scroll() {
                renderer.draw_twice(canvas, layout, area, scroll.positions(0), hidden);
                return;
            }
            renderer.draw(canvas, layout, area, renderer.start_x(layout, area), hidden);
        }
        _ => renderer.draw(canvas, layout, area, renderer.start_x(layout, area), hidden),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::canvas::GrayCanvas;
    use crate::widget::Widget;

    /// Render once and check the canvas-size contract.
    pub fn render_checked(widget: &dyn Widget) -> Option<GrayCanvas> {
        let canvas = widget.render().expect("render succeeds");
        if let Some(c) = &canvas {
            let p = widget.position();
            assert_eq!(
                (c.width() as i32, c.height() as i32),
                (p.w, p.h),
                "Widget {} rendered a canvas of the wrong size",
                widget.id()
            );
        }
        canvas
    }
}
