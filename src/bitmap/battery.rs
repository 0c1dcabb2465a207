//! Battery shape: outline with a terminal nub and proportional fill.

use serde::Deserialize;

use super::clamp_pct;
use super::shapes::draw_rect;
use crate::canvas::GrayCanvas;

/// Which way the battery points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryOrientation {
    /// Nub on the right, fills left to right.
    #[default]
    Horizontal,
    /// Nub on top, fills bottom to top.
    Vertical,
}

/// Nub thickness along the battery's long axis.
const NUB_DEPTH: i32 = 2;

/// Draw a battery in `(x, y, w, h)`.
///
/// `padding` is the gap between the outline and the fill.
#[allow(clippy::too_many_arguments)]
pub fn draw_battery(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    pct: f64,
    color: u8,
    padding: i32,
    orientation: BatteryOrientation,
) {
    let pct = clamp_pct(pct);
    let padding = padding.max(0);

    match orientation {
        BatteryOrientation::Horizontal => {
            let body_w = w - NUB_DEPTH;
            if body_w < 3 || h < 3 {
                return;
            }
            draw_rect(canvas, x, y, body_w, h, color);
            let nub_h = (h / 2).max(1);
            canvas.fill_rect(x + body_w, y + (h - nub_h) / 2, NUB_DEPTH, nub_h, color);

            let inner_w = body_w - 2 - 2 * padding;
            let inner_h = h - 2 - 2 * padding;
            if inner_w <= 0 || inner_h <= 0 {
                return;
            }
            let len = (f64::from(inner_w) * pct / 100.0).round() as i32;
            canvas.fill_rect(x + 1 + padding, y + 1 + padding, len, inner_h, color);
        }
        BatteryOrientation::Vertical => {
            let body_h = h - NUB_DEPTH;
            if w < 3 || body_h < 3 {
                return;
            }
            let body_y = y + NUB_DEPTH;
            draw_rect(canvas, x, body_y, w, body_h, color);
            let nub_w = (w / 2).max(1);
            canvas.fill_rect(x + (w - nub_w) / 2, y, nub_w, NUB_DEPTH, color);

            let inner_w = w - 2 - 2 * padding;
            let inner_h = body_h - 2 - 2 * padding;
            if inner_w <= 0 || inner_h <= 0 {
                return;
            }
            let len = (f64::from(inner_h) * pct / 100.0).round() as i32;
            let bottom = body_y + body_h - 1 - padding;
            canvas.fill_rect(x + 1 + padding, bottom - len, inner_w, len, color);
        }
    }
}
