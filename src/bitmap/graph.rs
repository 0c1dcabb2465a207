//! History line graphs.
//!
//! Samples are percentages (`0..=100`). The newest sample sits on the right
//! edge; with fewer samples than `history_len` the graph is right-aligned and
//! the left part stays empty while history fills up.
//!
//! Value to row: `y = bottom - round(v / 100 * (h - 1))`.

use super::clamp_pct;
use super::shapes::draw_line;
use crate::canvas::GrayCanvas;

/// Fill and line colors for one graph series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphColors {
    /// Area-under-line color; `None` draws the line only.
    pub fill: Option<u8>,
    pub line: u8,
}

impl GraphColors {
    pub const fn new(
        fill: Option<u8>,
        line: u8,
    ) -> Self {
        Self { fill, line }
    }
}

/// Screen points for a series, oldest first.
fn graph_points(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    history: &[f64],
    history_len: usize,
) -> Vec<(i32, i32)> {
    let slots = history_len.max(history.len()).max(1);
    let samples = &history[history.len().saturating_sub(slots)..];
    let offset = slots - samples.len();
    let bottom = y + h - 1;

    samples
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let slot = offset + i;
            let sx = if slots == 1 {
                x + w - 1
            } else {
                x + ((slot as f64) * f64::from(w - 1) / (slots - 1) as f64).round() as i32
            };
            let sy = bottom - ((clamp_pct(v) / 100.0) * f64::from(h - 1)).round() as i32;
            (sx, sy)
        })
        .collect()
}

/// Fill columns under the polyline down to the bottom row.
fn fill_under(
    canvas: &mut GrayCanvas,
    points: &[(i32, i32)],
    bottom: i32,
    color: u8,
) {
    if let [(px, py)] = points {
        canvas.fill_rect(*px, *py, 1, bottom - py + 1, color);
        return;
    }
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let span = (x1 - x0).max(1);
        for col in x0..=x1 {
            let t = f64::from(col - x0) / f64::from(span);
            let top = (f64::from(y0) + t * f64::from(y1 - y0)).round() as i32;
            canvas.fill_rect(col, top, 1, bottom - top + 1, color);
        }
    }
}

/// Draw one series into `(x, y, w, h)`.
#[allow(clippy::too_many_arguments)]
pub fn draw_graph(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    history: &[f64],
    history_len: usize,
    colors: GraphColors,
) {
    if w <= 0 || h <= 0 || history.is_empty() {
        return;
    }
    let points = graph_points(x, y, w, h, history, history_len);

    if let Some(fill) = colors.fill {
        fill_under(canvas, &points, y + h - 1, fill);
    }

    if let [(px, py)] = points.as_slice() {
        canvas.set(*px, *py, colors.line);
        return;
    }
    for pair in points.windows(2) {
        draw_line(canvas, pair[0].0, pair[0].1, pair[1].0, pair[1].1, colors.line);
    }
}

/// Two overlapping series: primary first, secondary drawn on top.
#[allow(clippy::too_many_arguments)]
pub fn draw_dual_graph(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    primary: &[f64],
    secondary: &[f64],
    history_len: usize,
    primary_colors: GraphColors,
    secondary_colors: GraphColors,
) {
    draw_graph(canvas, x, y, w, h, primary, history_len, primary_colors);
    draw_graph(canvas, x, y, w, h, secondary, history_len, secondary_colors);
}
