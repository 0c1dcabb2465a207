//! Frame-to-frame transitions.
//!
//! [`apply`] blends two equal-sized frames at a progress `p` in `[0, 1]`;
//! [`Transition`] holds the state of a running transition and derives `p`
//! from wall time on every read, so a frame loop running late still lands on
//! the right picture.
//!
//! # What goes where at progress `p`
//!
//! ```text
//! none             old while p < 0.5, then new
//! push_<dir>       both frames move by p*W (or p*H) toward <dir>; new enters
//!                  from the opposite edge
//! slide_<dir>      old stays put; new slides in from edge <dir>
//! dissolve_fade    round(old*(1-p) + new*p), halves rounded away from zero
//! dissolve_pixel   first floor(p*W*H) pixels of a shuffled order take new
//! dissolve_dither  new where bayer8x8[y%8][x%8] < p*64
//! box_in           centred box of half-size (1-p)*(W/2, H/2) keeps old
//! box_out          centred box of half-size p*(W/2, H/2) shows new
//! clock_wipe       new where the clockwise angle from 12 o'clock < 2*pi*p
//! random           one of the above, picked when the transition starts
//! ```
//!
//! At `p = 0` every transition yields exactly `old`, at `p = 1` exactly `new`.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::canvas::GrayCanvas;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    #[default]
    None,
    PushLeft,
    PushRight,
    PushUp,
    PushDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    DissolveFade,
    DissolvePixel,
    DissolveDither,
    BoxIn,
    BoxOut,
    ClockWipe,
    Random,
}

impl TransitionKind {
    /// Kinds `random` chooses from.
    pub const CONCRETE: [Self; 14] = [
        Self::PushLeft,
        Self::PushRight,
        Self::PushUp,
        Self::PushDown,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::DissolveFade,
        Self::DissolvePixel,
        Self::DissolveDither,
        Self::BoxIn,
        Self::BoxOut,
        Self::ClockWipe,
    ];

    /// Resolve `random` to a concrete kind; other kinds are returned as is.
    pub fn resolve<R: Rng + ?Sized>(
        self,
        rng: &mut R,
    ) -> Self {
        match self {
            Self::Random => Self::CONCRETE[rng.random_range(0..Self::CONCRETE.len())],
            other => other,
        }
    }
}

/// Ordered 8x8 Bayer threshold matrix (values 0..64).
const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

// =============================================================================
// Pure blend
// =============================================================================

/// Fisher-Yates shuffled pixel indices for `dissolve_pixel`.
pub fn pixel_order<R: Rng + ?Sized>(
    len: usize,
    rng: &mut R,
) -> Vec<u32> {
    let mut order: Vec<u32> = (0..len as u32).collect();
    order.shuffle(rng);
    order
}

/// Clockwise angle of pixel `(x, y)`'s centre from 12 o'clock, in `[0, 2*pi)`.
pub fn clock_angle(
    x: i32,
    y: i32,
    w: u32,
    h: u32,
) -> f64 {
    let dx = f64::from(x) + 0.5 - f64::from(w) / 2.0;
    let dy = f64::from(y) + 0.5 - f64::from(h) / 2.0;
    let a = dx.atan2(-dy);
    if a < 0.0 { a + TAU } else { a }
}

/// Fade blend of one pixel.
#[inline]
pub fn fade_pixel(
    old: u8,
    new: u8,
    p: f64,
) -> u8 {
    (f64::from(old) * (1.0 - p) + f64::from(new) * p).round().clamp(0.0, 255.0) as u8
}

/// Compose `old` and `new` at progress `p`.
///
/// `order` is the shuffled pixel order for `dissolve_pixel`; without one the
/// identity order is used. Frames of different sizes yield `new`.
pub fn apply(
    kind: TransitionKind,
    old: &GrayCanvas,
    new: &GrayCanvas,
    p: f64,
    order: Option<&[u32]>,
) -> GrayCanvas {
    if old.width() != new.width() || old.height() != new.height() {
        return new.clone();
    }
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    if p <= 0.0 {
        return old.clone();
    }
    if p >= 1.0 {
        return new.clone();
    }

    let (w, h) = (old.width() as i32, old.height() as i32);
    match kind {
        TransitionKind::None | TransitionKind::Random => {
            if p < 0.5 {
                old.clone()
            } else {
                new.clone()
            }
        }
        TransitionKind::PushLeft => {
            let d = (p * f64::from(w)).floor() as i32;
            map_pixels(old, new, |x, y| if x + d < w { (false, x + d, y) } else { (true, x + d - w, y) })
        }
        TransitionKind::PushRight => {
            let d = (p * f64::from(w)).floor() as i32;
            map_pixels(old, new, |x, y| if x >= d { (false, x - d, y) } else { (true, x - d + w, y) })
        }
        TransitionKind::PushUp => {
            let d = (p * f64::from(h)).floor() as i32;
            map_pixels(old, new, |x, y| if y + d < h { (false, x, y + d) } else { (true, x, y + d - h) })
        }
        TransitionKind::PushDown => {
            let d = (p * f64::from(h)).floor() as i32;
            map_pixels(old, new, |x, y| if y >= d { (false, x, y - d) } else { (true, x, y - d + h) })
        }
        TransitionKind::SlideLeft => {
            let d = (p * f64::from(w)).floor() as i32;
            map_pixels(old, new, |x, y| if x < d { (true, x - d + w, y) } else { (false, x, y) })
        }
        TransitionKind::SlideRight => {
            let d = (p * f64::from(w)).floor() as i32;
            map_pixels(old, new, |x, y| if x >= w - d { (true, x - (w - d), y) } else { (false, x, y) })
        }
        TransitionKind::SlideUp => {
            let d = (p * f64::from(h)).floor() as i32;
            map_pixels(old, new, |x, y| if y < d { (true, x, y - d + h) } else { (false, x, y) })
        }
        TransitionKind::SlideDown => {
            let d = (p * f64::from(h)).floor() as i32;
            map_pixels(old, new, |x, y| if y >= h - d { (true, x, y - (h - d)) } else { (false, x, y) })
        }
        TransitionKind::DissolveFade => {
            let mut out = old.clone();
            for (dst, &n) in out.as_bytes_mut().iter_mut().zip(new.as_bytes()) {
                *dst = fade_pixel(*dst, n, p);
            }
            out
        }
        TransitionKind::DissolvePixel => {
            let mut out = old.clone();
            let len = out.area();
            let n = ((p * len as f64).floor() as usize).min(len);
            let src = new.as_bytes();
            let dst = out.as_bytes_mut();
            match order {
                Some(order) => {
                    for &i in order.iter().take(n) {
                        let i = i as usize;
                        if i < len {
                            dst[i] = src[i];
                        }
                    }
                }
                None => dst[..n].copy_from_slice(&src[..n]),
            }
            out
        }
        TransitionKind::DissolveDither => {
            let threshold = p * 64.0;
            select_pixels(old, new, |x, y| f64::from(BAYER_8X8[(y % 8) as usize][(x % 8) as usize]) < threshold)
        }
        TransitionKind::BoxIn => {
            let (hw, hh) = ((1.0 - p) * f64::from(w) / 2.0, (1.0 - p) * f64::from(h) / 2.0);
            select_pixels(old, new, |x, y| !in_centered_box(x, y, w, h, hw, hh))
        }
        TransitionKind::BoxOut => {
            let (hw, hh) = (p * f64::from(w) / 2.0, p * f64::from(h) / 2.0);
            select_pixels(old, new, |x, y| in_centered_box(x, y, w, h, hw, hh))
        }
        TransitionKind::ClockWipe => {
            let sweep = TAU * p;
            let (cw, ch) = (old.width(), old.height());
            select_pixels(old, new, |x, y| clock_angle(x, y, cw, ch) < sweep)
        }
    }
}

/// Whether pixel `(x, y)`'s centre lies strictly inside the centred box.
#[inline]
fn in_centered_box(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    half_w: f64,
    half_h: f64,
) -> bool {
    let dx = (f64::from(x) + 0.5 - f64::from(w) / 2.0).abs();
    let dy = (f64::from(y) + 0.5 - f64::from(h) / 2.0).abs();
    dx < half_w && dy < half_h
}

/// Per-pixel choice between `old` and `new` at the same coordinates.
fn select_pixels<F>(
    old: &GrayCanvas,
    new: &GrayCanvas,
    take_new: F,
) -> GrayCanvas
where
    F: Fn(i32, i32) -> bool,
{
    let mut out = old.clone();
    let stride = out.stride();
    let src = new.as_bytes();
    let dst = out.as_bytes_mut();
    for y in 0..old.height() as i32 {
        for x in 0..old.width() as i32 {
            if take_new(x, y) {
                let i = y as usize * stride + x as usize;
                dst[i] = src[i];
            }
        }
    }
    out
}

/// Per-pixel fetch from `(from_new, sx, sy)` for translating transitions.
/// Sources outside the frame leave the destination pixel untouched.
fn map_pixels<F>(
    old: &GrayCanvas,
    new: &GrayCanvas,
    source: F,
) -> GrayCanvas
where
    F: Fn(i32, i32) -> (bool, i32, i32),
{
    let mut out = old.clone();
    for y in 0..old.height() as i32 {
        for x in 0..old.width() as i32 {
            let (from_new, sx, sy) = source(x, y);
            let frame = if from_new { new } else { old };
            if let Some(v) = frame.get(sx, sy) {
                out.set(x, y, v);
            }
        }
    }
    out
}

// =============================================================================
// Running transition
// =============================================================================

/// A transition in progress between a captured old frame and live new frames.
pub struct Transition {
    kind: TransitionKind,
    started: Instant,
    duration: Duration,
    old: GrayCanvas,
    order: Option<Vec<u32>>,
}

impl Transition {
    /// Begin a transition away from `old`.
    pub fn start(
        kind: TransitionKind,
        duration: Duration,
        old: GrayCanvas,
        now: Instant,
    ) -> Self {
        Self::start_with_rng(kind, duration, old, now, &mut rand::rng())
    }

    /// As [`Transition::start`] with a caller-supplied RNG.
    pub fn start_with_rng<R: Rng + ?Sized>(
        kind: TransitionKind,
        duration: Duration,
        old: GrayCanvas,
        now: Instant,
        rng: &mut R,
    ) -> Self {
        let kind = kind.resolve(rng);
        let order = (kind == TransitionKind::DissolvePixel).then(|| pixel_order(old.area(), rng));
        Self {
            kind,
            started: now,
            duration,
            old,
            order,
        }
    }

    /// Concrete kind (never `Random`).
    #[inline]
    pub const fn kind(&self) -> TransitionKind { self.kind }

    #[inline]
    pub const fn old_frame(&self) -> &GrayCanvas { &self.old }

    /// Live progress at `now`.
    pub fn progress(
        &self,
        now: Instant,
    ) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(
        &self,
        now: Instant,
    ) -> bool {
        self.progress(now) >= 1.0
    }

    /// Frame to show at `now` given the latest composed frame.
    pub fn render(
        &self,
        new: &GrayCanvas,
        now: Instant,
    ) -> GrayCanvas {
        apply(self.kind, &self.old, new, self.progress(now), self.order.as_deref())
    }
}
