//! Progress bars: single and dual, horizontal and vertical.
//!
//! A single bar reserves its outer 1px ring: the fill covers only the
//! interior, and the ring carries the outline when a border color is given.
//! A dual bar splits its long axis in half and fills each half to its full
//! extent, inside the outline when there is one. Fill length is
//! `round(len * clamp(pct) / 100)`.

use serde::Deserialize;

use super::clamp_pct;
use super::shapes::draw_rect;
use crate::canvas::GrayCanvas;

/// Fill direction of a bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Rectangle inside the 1px ring.
#[inline]
const fn interior(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) -> (i32, i32, i32, i32) {
    (x + 1, y + 1, w - 2, h - 2)
}

#[inline]
fn fill_len(
    len: i32,
    pct: f64,
) -> i32 {
    if len <= 0 {
        return 0;
    }
    ((f64::from(len) * clamp_pct(pct) / 100.0).round() as i32).clamp(0, len)
}

fn fill_left_to_right(
    canvas: &mut GrayCanvas,
    (x, y, w, h): (i32, i32, i32, i32),
    pct: f64,
    fill: u8,
) {
    if w > 0 && h > 0 {
        canvas.fill_rect(x, y, fill_len(w, pct), h, fill);
    }
}

fn fill_bottom_to_top(
    canvas: &mut GrayCanvas,
    (x, y, w, h): (i32, i32, i32, i32),
    pct: f64,
    fill: u8,
) {
    if w > 0 && h > 0 {
        let len = fill_len(h, pct);
        canvas.fill_rect(x, y + h - len, w, len, fill);
    }
}

/// Outline the ring when asked; return the rectangle left for the fill.
fn frame(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    border: Option<u8>,
) -> (i32, i32, i32, i32) {
    if let Some(color) = border {
        draw_rect(canvas, x, y, w, h, color);
    }
    interior(x, y, w, h)
}

/// Bar filled left to right.
#[allow(clippy::too_many_arguments)]
pub fn draw_horizontal_bar(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    pct: f64,
    fill: u8,
    border: Option<u8>,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let inner = frame(canvas, x, y, w, h, border);
    fill_left_to_right(canvas, inner, pct, fill);
}

/// Bar filled bottom to top.
#[allow(clippy::too_many_arguments)]
pub fn draw_vertical_bar(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    pct: f64,
    fill: u8,
    border: Option<u8>,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let inner = frame(canvas, x, y, w, h, border);
    fill_bottom_to_top(canvas, inner, pct, fill);
}

/// Two horizontal bars side by side: primary in the left half, secondary in the right.
#[allow(clippy::too_many_arguments)]
pub fn draw_dual_horizontal_bar(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    primary_pct: f64,
    secondary_pct: f64,
    primary_fill: u8,
    secondary_fill: u8,
    border: Option<u8>,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (x, y, w, h) = if border.is_some() { frame(canvas, x, y, w, h, border) } else { (x, y, w, h) };
    let first = w / 2;
    fill_left_to_right(canvas, (x, y, first, h), primary_pct, primary_fill);
    fill_left_to_right(canvas, (x + first, y, w - first, h), secondary_pct, secondary_fill);
}

/// Two vertical bars stacked: primary in the top half, secondary in the bottom.
#[allow(clippy::too_many_arguments)]
pub fn draw_dual_vertical_bar(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    primary_pct: f64,
    secondary_pct: f64,
    primary_fill: u8,
    secondary_fill: u8,
    border: Option<u8>,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (x, y, w, h) = if border.is_some() { frame(canvas, x, y, w, h, border) } else { (x, y, w, h) };
    let first = h / 2;
    fill_bottom_to_top(canvas, (x, y, w, first), primary_pct, primary_fill);
    fill_bottom_to_top(canvas, (x, y + first, w, h - first), secondary_pct, secondary_fill);
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Pixels on the outer 1px ring of a `w x h` canvas.
    fn ring(c: &GrayCanvas) -> Vec<u8> {
        let (w, h) = (c.width() as i32, c.height() as i32);
        let mut out = Vec::new();
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    out.push(c.get(x, y).unwrap_or_default());
                }
            }
        }
        out
    }

    #[test]
    fn test_bar_empty_and_full() {
        let mut empty = GrayCanvas::new(64, 20);
        draw_horizontal_bar(&mut empty, 0, 0, 64, 20, 0.0, 255, None);
        assert_eq!(empty.count_value(255), 0, "0% bar leaves every pixel at 0");

        let mut full = GrayCanvas::new(64, 20);
        draw_horizontal_bar(&mut full, 0, 0, 64, 20, 100.0, 255, None);
        assert_eq!(full.count_value(255), 62 * 18, "100% bar fills exactly the interior");
        let perimeter = ring(&full);
        assert_eq!(perimeter.len(), 2 * 64 + 2 * 18);
        assert!(perimeter.iter().all(|&p| p == 0), "Perimeter stays 0 without a border");
    }

    #[test]
    fn test_vertical_bar_full_keeps_ring_clear() {
        let mut c = GrayCanvas::new(8, 30);
        draw_vertical_bar(&mut c, 0, 0, 8, 30, 100.0, 255, None);
        assert_eq!(c.count_value(255), 6 * 28);
        assert!(ring(&c).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_bar_with_border_keeps_perimeter() {
        let mut c = GrayCanvas::new(64, 20);
        draw_horizontal_bar(&mut c, 0, 0, 64, 20, 100.0, 255, Some(100));
        assert_eq!(c.count_value(255), 62 * 18, "Interior fill excludes the border ring");
        assert!(ring(&c).iter().all(|&p| p == 100), "Border is drawn on the ring");
    }

    #[test]
    fn test_bar_half() {
        let mut c = GrayCanvas::new(40, 4);
        draw_horizontal_bar(&mut c, 0, 0, 40, 4, 50.0, 200, None);
        assert_eq!(c.get(1, 1), Some(200));
        assert_eq!(c.get(19, 1), Some(200), "Half of the 38 px interior is 19 px");
        assert_eq!(c.get(20, 1), Some(0));
    }

    #[test]
    fn test_vertical_bar_fills_from_bottom() {
        let mut c = GrayCanvas::new(4, 12);
        draw_vertical_bar(&mut c, 0, 0, 4, 12, 30.0, 255, None);
        assert_eq!(c.get(1, 10), Some(255));
        assert_eq!(c.get(1, 8), Some(255));
        assert_eq!(c.get(1, 7), Some(0), "Only the bottom 3 interior rows should be filled");
        assert_eq!(c.get(1, 11), Some(0), "Bottom ring row stays clear");
    }

    #[test]
    fn test_dual_horizontal_bar_halves() {
        let mut c = GrayCanvas::new(100, 6);
        draw_dual_horizontal_bar(&mut c, 0, 0, 100, 6, 100.0, 50.0, 255, 128, None);
        let primary_row: usize = (0..50).filter(|&x| c.get(x, 0) == Some(255)).count();
        let secondary_row: usize = (50..100).filter(|&x| c.get(x, 0) == Some(128)).count();
        assert_eq!(primary_row, 50);
        assert_eq!(secondary_row, 25);
    }

    #[test]
    fn test_dual_horizontal_bar_inside_border() {
        let mut c = GrayCanvas::new(102, 6);
        draw_dual_horizontal_bar(&mut c, 0, 0, 102, 6, 100.0, 100.0, 255, 128, Some(60));
        assert_eq!(c.get(0, 3), Some(60));
        assert_eq!(c.get(1, 3), Some(255));
        assert_eq!(c.get(51, 3), Some(128), "Secondary half starts after 50 interior px");
        assert_eq!(c.get(101, 3), Some(60));
    }

    #[test]
    fn test_dual_vertical_bar_halves() {
        let mut c = GrayCanvas::new(4, 20);
        draw_dual_vertical_bar(&mut c, 0, 0, 4, 20, 100.0, 0.0, 255, 128, None);
        assert_eq!(c.get(0, 0), Some(255));
        assert_eq!(c.get(0, 9), Some(255));
        assert_eq!(c.get(0, 10), Some(0), "Secondary half at 0% stays empty");
    }

    proptest! {
        #[test]
        fn prop_bar_matches_clamped(pct in -500.0f64..500.0) {
            let mut raw = GrayCanvas::new(30, 5);
            let mut clamped = GrayCanvas::new(30, 5);
            draw_horizontal_bar(&mut raw, 0, 0, 30, 5, pct, 255, Some(80));
            draw_horizontal_bar(&mut clamped, 0, 0, 30, 5, clamp_pct(pct), 255, Some(80));
            prop_assert_eq!(raw, clamped);
        }
    }
}
