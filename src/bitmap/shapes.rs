//! Basic shapes: rectangles, canvas border, lines and circles.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment};

use crate::canvas::{GrayCanvas, gray};

/// Draw a 1px rectangle outline inside `(x, y, w, h)`.
pub fn draw_rect(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: u8,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    let style = PrimitiveStyleBuilder::new()
        .stroke_color(gray(color))
        .stroke_width(1)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();
    Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32))
        .into_styled(style)
        .draw(canvas)
        .ok();
}

/// Fill `(x, y, w, h)` with `color`.
#[inline]
pub fn fill_rect(
    canvas: &mut GrayCanvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: u8,
) {
    canvas.fill_rect(x, y, w, h, color);
}

/// Outline the whole canvas perimeter.
pub fn draw_border(
    canvas: &mut GrayCanvas,
    color: u8,
) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    draw_rect(canvas, 0, 0, w, h, color);
}

/// Bresenham line between two points, inclusive.
pub fn draw_line(
    canvas: &mut GrayCanvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: u8,
) {
    Line::new(Point::new(x0, y0), Point::new(x1, y1))
        .into_styled(PrimitiveStyle::with_stroke(gray(color), 1))
        .draw(canvas)
        .ok();
}

/// Midpoint circle outline centred on `(cx, cy)`.
pub fn draw_circle(
    canvas: &mut GrayCanvas,
    cx: i32,
    cy: i32,
    r: i32,
    color: u8,
) {
    if r < 0 {
        return;
    }
    if r == 0 {
        canvas.set(cx, cy, color);
        return;
    }

    let mut x = r;
    let mut y = 0;
    let mut err = 1 - r;

    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            canvas.set(cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
