//! Pixel-level drawing primitives on a [`GrayCanvas`](crate::canvas::GrayCanvas).
//!
//! Every function here is a pure function of the canvas and its arguments.
//! Coordinates are integer pixels with the origin at the top-left and `y`
//! growing downward; anything outside the canvas is clipped.
//!
//! - [`shapes`]: rectangles, border, Bresenham lines, midpoint circles
//! - [`bars`]: single and dual horizontal/vertical bars
//! - [`graph`]: history line graphs with optional area fill
//! - [`gauge`]: semicircular gauges with ticks and needles
//! - [`battery`]: battery outline with proportional fill
//! - [`text`]: measurement, aligned and clipped text drawing

pub mod bars;
pub mod battery;
pub mod gauge;
pub mod graph;
pub mod shapes;
pub mod text;

pub use bars::{BarDirection, draw_dual_horizontal_bar, draw_dual_vertical_bar, draw_horizontal_bar, draw_vertical_bar};
pub use battery::{BatteryOrientation, draw_battery};
pub use gauge::{GaugeColors, draw_dual_gauge, draw_gauge};
pub use graph::{GraphColors, draw_dual_graph, draw_graph};
pub use shapes::{draw_border, draw_circle, draw_line, draw_rect, fill_rect};
pub use text::{HAlign, VAlign, draw_aligned_text, draw_text_at, measure_text};

/// Clamp a percentage into `[0, 100]`. NaN maps to 0.
#[inline]
pub fn clamp_pct(pct: f64) -> f64 {
    if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) }
}
