//! Text measurement and drawing with mono fonts.
//!
//! Measurement is exact for mono fonts: `n` characters are
//! `n * glyph_width + (n - 1) * spacing` pixels wide and one cell tall.
//! Text is drawn with a top baseline at the computed origin, which keeps
//! the layout math in whole cells.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use serde::Deserialize;

use crate::canvas::{GrayCanvas, gray};
use crate::fonts::Font;

/// Horizontal alignment inside a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment inside a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl HAlign {
    /// Offset of an item of `size` inside a span of `avail`.
    #[inline]
    pub const fn offset(
        self,
        avail: i32,
        size: i32,
    ) -> i32 {
        match self {
            Self::Left => 0,
            Self::Center => (avail - size).div_euclid(2),
            Self::Right => avail - size,
        }
    }
}

impl VAlign {
    /// Offset of an item of `size` inside a span of `avail`.
    #[inline]
    pub const fn offset(
        self,
        avail: i32,
        size: i32,
    ) -> i32 {
        match self {
            Self::Top => 0,
            Self::Center => (avail - size).div_euclid(2),
            Self::Bottom => avail - size,
        }
    }
}

/// Pixel size `(w, h)` of `text` in `font`.
pub fn measure_text(
    text: &str,
    font: Font,
) -> (i32, i32) {
    let n = text.chars().count() as i32;
    let h = font.character_size.height as i32;
    if n == 0 {
        return (0, h);
    }
    let w = n * font.character_size.width as i32 + (n - 1) * font.character_spacing as i32;
    (w, h)
}

/// Draw `text` with its top-left at `(x, y)`, optionally clipped to `clip`.
#[allow(clippy::too_many_arguments)]
pub fn draw_text_at(
    canvas: &mut GrayCanvas,
    text: &str,
    font: Font,
    x: i32,
    y: i32,
    clip: Option<Rectangle>,
    color: u8,
) {
    if text.is_empty() {
        return;
    }
    let style = MonoTextStyle::new(font, gray(color));
    let drawable = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top);
    match clip {
        Some(area) => {
            drawable.draw(&mut canvas.clipped(&area)).ok();
        }
        None => {
            drawable.draw(canvas).ok();
        }
    }
}

/// Draw `text` aligned inside the canvas minus `padding` on every side.
///
/// Text larger than the padded area is clipped to it.
#[allow(clippy::too_many_arguments)]
pub fn draw_aligned_text(
    canvas: &mut GrayCanvas,
    text: &str,
    font: Font,
    h_align: HAlign,
    v_align: VAlign,
    padding: i32,
    color: u8,
) {
    let area_w = canvas.width() as i32 - 2 * padding;
    let area_h = canvas.height() as i32 - 2 * padding;
    if area_w <= 0 || area_h <= 0 {
        return;
    }
    let (tw, th) = measure_text(text, font);
    let x = padding + h_align.offset(area_w, tw);
    let y = padding + v_align.offset(area_h, th);
    let clip = Rectangle::new(Point::new(padding, padding), Size::new(area_w as u32, area_h as u32));
    draw_text_at(canvas, text, font, x, y, Some(clip), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts;

    fn font_6x10() -> Font { fonts::resolve(10, None) }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of pixels equal to `value`.
    fn ink_bounds(
        c: &GrayCanvas,
        value: u8,
    ) -> Option<(i32, i32, i32, i32)> {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for y in 0..c.height() as i32 {
            for x in 0..c.width() as i32 {
                if c.get(x, y) == Some(value) {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((a, b, cc, d)) => (a.min(x), b.min(y), cc.max(x), d.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn test_center_offset_floors_negative_slack() {
        assert_eq!(HAlign::Center.offset(60, 65), -3);
        assert_eq!(VAlign::Center.offset(10, 13), -2);
        assert_eq!(HAlign::Center.offset(60, 54), 3);
    }

    #[test]
    fn test_measure_text() {
        assert_eq!(measure_text("", font_6x10()), (0, 10));
        assert_eq!(measure_text("A", font_6x10()), (6, 10));
        assert_eq!(measure_text("ABCD", font_6x10()), (24, 10));
        assert_eq!(measure_text("BT", fonts::resolve(8, None)), (10, 8));
    }

    #[test]
    fn test_left_top_text_starts_at_padding() {
        let mut c = GrayCanvas::new(60, 20);
        draw_aligned_text(&mut c, "HI", font_6x10(), HAlign::Left, VAlign::Top, 2, 255);
        let (min_x, min_y, _, _) = ink_bounds(&c, 255).expect("text should draw pixels");
        assert!(min_x >= 2 && min_x < 8, "Ink should start near the left padding, got {min_x}");
        assert!(min_y >= 2, "Ink should not enter the top padding, got {min_y}");
    }

    #[test]
    fn test_right_aligned_text_ends_at_padding() {
        let mut c = GrayCanvas::new(60, 20);
        draw_aligned_text(&mut c, "HI", font_6x10(), HAlign::Right, VAlign::Bottom, 0, 255);
        let (min_x, _, max_x, max_y) = ink_bounds(&c, 255).expect("text should draw pixels");
        assert!(min_x >= 48, "Right-aligned ink starts in the last 12 columns, got {min_x}");
        assert!(max_x <= 59);
        assert!(max_y <= 19);
    }

    #[test]
    fn test_centered_text_is_roughly_centered() {
        let mut c = GrayCanvas::new(60, 20);
        draw_aligned_text(&mut c, "8888", font_6x10(), HAlign::Center, VAlign::Center, 0, 255);
        let (min_x, _, max_x, _) = ink_bounds(&c, 255).expect("text should draw pixels");
        let left_gap = min_x;
        let right_gap = 59 - max_x;
        assert!((left_gap - right_gap).abs() <= 2, "Gaps {left_gap} / {right_gap} should balance");
    }

    #[test]
    fn test_clip_rect_limits_drawing() {
        let mut c = GrayCanvas::new(60, 20);
        let clip = Rectangle::new(Point::new(0, 0), Size::new(10, 20));
        draw_text_at(&mut c, "WWWWWWWW", font_6x10(), 0, 0, Some(clip), 255);
        let (_, _, max_x, _) = ink_bounds(&c, 255).expect("text should draw pixels");
        assert!(max_x < 10, "Nothing may be drawn past the clip rect, got {max_x}");
    }

    #[test]
    fn test_padding_larger_than_canvas_draws_nothing() {
        let mut c = GrayCanvas::new(10, 10);
        draw_aligned_text(&mut c, "X", font_6x10(), HAlign::Left, VAlign::Top, 6, 255);
        assert_eq!(c.count_value(255), 0);
    }
}
