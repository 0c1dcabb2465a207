//! 8-bit grayscale canvas used by widgets and the compositor.
//!
//! A canvas is a row-major byte array indexed `[y][x]`; 0 is the panel's
//! background intensity and 255 the brightest foreground. There is no alpha
//! channel. Widgets that want a transparent background leave unused pixels
//! at 0 and the compositor skips them when blitting.
//!
//! The canvas implements [`DrawTarget`] with [`Gray8`] pixels, so every
//! `embedded-graphics` primitive and mono font draws onto it directly. Pixels
//! outside the canvas are silently dropped.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

// =============================================================================
// Canvas
// =============================================================================

/// Owned grayscale pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct GrayCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayCanvas {
    /// Create a canvas filled with 0.
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a canvas filled with `value`.
    pub fn filled(
        width: u32,
        height: u32,
        value: u8,
    ) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Stride in bytes (one byte per pixel, no row padding).
    #[inline]
    pub const fn stride(&self) -> usize { self.width as usize }

    /// Raw row-major pixel bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.pixels }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] { &mut self.pixels }

    /// Number of pixels.
    #[inline]
    pub const fn area(&self) -> usize { self.pixels.len() }

    /// Bounding rectangle at the origin.
    pub const fn rect(&self) -> Rectangle { Rectangle::new(Point::zero(), Size::new(self.width, self.height)) }

    #[inline]
    const fn index(
        &self,
        x: i32,
        y: i32,
    ) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Pixel value, or `None` when out of bounds.
    #[inline]
    pub fn get(
        &self,
        x: i32,
        y: i32,
    ) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel; out-of-bounds writes are ignored.
    #[inline]
    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        value: u8,
    ) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Fill every pixel with `value`.
    pub fn fill(
        &mut self,
        value: u8,
    ) {
        self.pixels.fill(value);
    }

    /// Fill a clipped rectangle.
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        value: u8,
    ) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.stride();
        for row in y0..y1 {
            let start = row as usize * stride;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(value);
        }
    }

    /// Copy `src` onto this canvas with its top-left at `(x, y)`.
    ///
    /// With `skip_zero` set, source pixels equal to 0 are treated as
    /// transparent and leave the destination untouched.
    pub fn blit(
        &mut self,
        src: &Self,
        x: i32,
        y: i32,
        skip_zero: bool,
    ) {
        let dst_stride = self.stride();
        let src_stride = src.stride();
        for sy in 0..src.height as i32 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let v = src.pixels[sy as usize * src_stride + sx as usize];
                if skip_zero && v == 0 {
                    continue;
                }
                self.pixels[dy as usize * dst_stride + dx as usize] = v;
            }
        }
    }

    /// Count pixels with `value` (test and diagnostics helper).
    pub fn count_value(
        &self,
        value: u8,
    ) -> usize {
        self.pixels.iter().filter(|&&p| p == value).count()
    }
}

impl core::fmt::Debug for GrayCanvas {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("GrayCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl OriginDimensions for GrayCanvas {
    fn size(&self) -> Size { Size::new(self.width, self.height) }
}

impl DrawTarget for GrayCanvas {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point.x, point.y, color.luma());
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width as i32,
            area.size.height as i32,
            color.luma(),
        );
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.fill(color.luma());
        Ok(())
    }
}

/// Shorthand for a gray level as an `embedded-graphics` color.
#[inline]
pub const fn gray(value: u8) -> Gray8 { Gray8::new(value) }

/// Convert a configured color (`-1` = none) to an optional gray level.
#[inline]
pub fn color_opt(value: i32) -> Option<u8> {
    if value < 0 { None } else { Some(value.min(255) as u8) }
}

// =============================================================================
// Tests
// =============================================================================
