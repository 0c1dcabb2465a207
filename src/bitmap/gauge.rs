//! Semicircular gauges.
//!
//! The arc spans the upper half of a circle whose centre sits on the bottom
//! row of the gauge rectangle. Needle angle is linear in the percentage:
//!
//! ```text
//! angle = GAUGE_START_DEG + pct / 100 * GAUGE_SWEEP_DEG
//!
//!          90°
//!      .-""""""-.
//!    /            \
//!   180° -------- 0°      0% points left, 50% up, 100% right
//! ```
//!
//! Angles are mathematical (counter-clockwise from the +x axis); the `y`
//! flip to screen space happens in [`polar`].

use super::clamp_pct;
use super::shapes::draw_line;
use crate::canvas::GrayCanvas;

/// Angle of the 0% position, in degrees.
pub const GAUGE_START_DEG: f64 = 180.0;

/// Signed angular range covered from 0% to 100%, in degrees.
pub const GAUGE_SWEEP_DEG: f64 = -180.0;

/// Tick positions in percent.
const TICKS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// Tick mark length in pixels.
const TICK_LEN: i32 = 3;

/// Inner arc radius relative to the outer arc in a dual gauge.
const DUAL_INNER_RATIO: f64 = 0.6;

/// Colors for one gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaugeColors {
    pub arc: u8,
    pub needle: u8,
    /// Tick color; `None` hides ticks.
    pub ticks: Option<u8>,
}

/// Needle angle in degrees for a percentage.
#[inline]
pub fn needle_angle(pct: f64) -> f64 { GAUGE_START_DEG + clamp_pct(pct) / 100.0 * GAUGE_SWEEP_DEG }

/// Point at `radius` and `deg` from `(cx, cy)` in screen coordinates.
#[inline]
fn polar(
    cx: i32,
    cy: i32,
    radius: f64,
    deg: f64,
) -> (i32, i32) {
    let rad = deg.to_radians();
    (
        cx + (radius * rad.cos()).round() as i32,
        cy - (radius * rad.sin()).round() as i32,
    )
}

/// Centre and outer radius of the gauge inside `(x, y, w, h)`.
#[inline]
fn geometry(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) -> (i32, i32, i32) {
    let cx = x + w / 2;
    let cy = y + h - 1;
    let r = ((w - 1) / 2).min(h - 1);
    (cx, cy, r)
}

fn draw_arc(
    canvas: &mut GrayCanvas,
    cx: i32,
    cy: i32,
    r: i32,
    color: u8,
) {
    if r <= 0 {
        canvas.set(cx, cy, color);
        return;
    }
    let steps = (r * 4).max(16);
    let mut prev = polar(cx, cy, f64::from(r), GAUGE_START_DEG);
    for i in 1..=steps {
        let deg = GAUGE_START_DEG + f64::from(i) / f64::from(steps) * GAUGE_SWEEP_DEG;
        let next = polar(cx, cy, f64::from(r), deg);
        draw_line(canvas, prev.0, prev.1, next.0, next.1, color);
        prev = next;
    }
}

fn draw_ticks(
    canvas: &mut GrayCanvas,
    cx: i32,
    cy: i32,
    r: i32,
    color: u8,
) {
    let inner = f64::from((r - TICK_LEN).max(0));
    for pct in TICKS {
        let deg = needle_angle(pct);
        let (x0, y0) = polar(cx, cy, inner, deg);
        let (x1, y1) = polar(cx, cy, f64::from(r), deg);
        draw_line(canvas, x0, y0, x1, y1, color);
    }
}

fn draw_needle(
    canvas: &mut GrayCanvas,
    cx: i32,
    cy: i32,
    len: i32,
    pct: f64,
    color: u8,
) {
    let (nx, ny) = polar(cx, cy, f64::from(len.max(0)), needle_angle(pct));
    draw_line(canvas, cx, cy, nx, ny, color);
}

/// Single gauge: arc, optional ticks, needle.
#[allow(clippy::too_many_arguments)]
pub fn draw_gauge(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    pct: f64,
    colors: GaugeColors,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (cx, cy, r) = geometry(x, y, w, h);
    draw_arc(canvas, cx, cy, r, colors.arc);
    if let Some(tick) = colors.ticks {
        draw_ticks(canvas, cx, cy, r, tick);
    }
    draw_needle(canvas, cx, cy, r - 2, pct, colors.needle);
}

/// Two concentric gauges: outer arc for the primary value, inner for the secondary.
#[allow(clippy::too_many_arguments)]
pub fn draw_dual_gauge(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    primary_pct: f64,
    secondary_pct: f64,
    primary: GaugeColors,
    secondary: GaugeColors,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (cx, cy, r) = geometry(x, y, w, h);
    let inner = (f64::from(r) * DUAL_INNER_RATIO).round() as i32;

    draw_arc(canvas, cx, cy, r, primary.arc);
    draw_arc(canvas, cx, cy, inner, secondary.arc);
    if let Some(tick) = primary.ticks {
        draw_ticks(canvas, cx, cy, r, tick);
    }
    draw_needle(canvas, cx, cy, r - 2, primary_pct, primary.needle);
    draw_needle(canvas, cx, cy, inner - 2, secondary_pct, secondary.needle);
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: GaugeColors = GaugeColors {
        arc: 200,
        needle: 255,
        ticks: None,
    };

    #[test]
    fn test_needle_angle_mapping() {
        assert_eq!(needle_angle(0.0), 180.0);
        assert_eq!(needle_angle(50.0), 90.0);
        assert_eq!(needle_angle(100.0), 0.0);
        assert_eq!(needle_angle(150.0), 0.0, "Angle uses the clamped percentage");
    }

    #[test]
    fn test_arc_endpoints_on_bottom_row() {
        let mut c = GrayCanvas::new(41, 21);
        draw_gauge(&mut c, 0, 0, 41, 21, 50.0, COLORS);
        let (cx, cy, r) = geometry(0, 0, 41, 21);
        assert_eq!(c.get(cx - r, cy), Some(200), "Arc starts at the left end of the bottom row");
        assert_eq!(c.get(cx + r, cy), Some(200), "Arc ends at the right end of the bottom row");
        assert_eq!(c.get(cx, cy - r), Some(200), "Arc apex sits above the centre");
    }

    #[test]
    fn test_needle_points_up_at_half() {
        let mut c = GrayCanvas::new(41, 21);
        draw_gauge(&mut c, 0, 0, 41, 21, 50.0, COLORS);
        let (cx, cy, _) = geometry(0, 0, 41, 21);
        assert_eq!(c.get(cx, cy - 5), Some(255), "50% needle is vertical");
        assert_eq!(c.get(cx - 5, cy), Some(0));
    }

    #[test]
    fn test_needle_points_left_at_zero() {
        let mut c = GrayCanvas::new(41, 21);
        draw_gauge(&mut c, 0, 0, 41, 21, 0.0, COLORS);
        let (cx, cy, _) = geometry(0, 0, 41, 21);
        assert_eq!(c.get(cx - 5, cy), Some(255), "0% needle lies along the bottom row to the left");
    }

    #[test]
    fn test_ticks_drawn_when_enabled() {
        let mut c = GrayCanvas::new(41, 21);
        let colors = GaugeColors {
            ticks: Some(150),
            ..COLORS
        };
        draw_gauge(&mut c, 0, 0, 41, 21, 0.0, colors);
        assert!(c.count_value(150) > 0, "Tick marks should be visible");
    }

    #[test]
    fn test_dual_gauge_inner_needle() {
        let mut c = GrayCanvas::new(41, 21);
        let secondary = GaugeColors {
            arc: 90,
            needle: 120,
            ticks: None,
        };
        draw_dual_gauge(&mut c, 0, 0, 41, 21, 0.0, 100.0, COLORS, secondary);
        let (cx, cy, _) = geometry(0, 0, 41, 21);
        assert!(c.count_value(90) > 0, "Inner arc drawn");
        assert_eq!(c.get(cx + 3, cy), Some(120), "Secondary needle at 100% points right");
    }
}
