//! Scrolling text offsets.
//!
//! A [`ScrollAnimator`] turns elapsed time into a pixel offset along one axis.
//! The widget measures its text and content box, calls
//! [`ScrollAnimator::set_extent`], advances the animator, then asks for draw
//! positions.
//!
//! # Modes
//!
//! ```text
//! continuous   offset grows forever, wrapped at text + gap; the text is
//!              drawn twice so the loop is seamless
//! bounce       offset moves between 0 and text - content, reversing at ends
//! pause_ends   like bounce, but holds `pause_ms` at each end
//! ```

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::ScrollConfig;

/// Direction the text travels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Left,
    Right,
    Up,
    Down,
}

impl ScrollDirection {
    /// Whether scrolling runs along the x axis.
    #[inline]
    pub const fn is_horizontal(self) -> bool { matches!(self, Self::Left | Self::Right) }

    /// Whether text moves toward negative coordinates.
    #[inline]
    const fn is_negative(self) -> bool { matches!(self, Self::Left | Self::Up) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    #[default]
    Continuous,
    Bounce,
    PauseEnds,
}

/// Time-driven scroll offset.
#[derive(Clone, Debug)]
pub struct ScrollAnimator {
    speed: f64,
    direction: ScrollDirection,
    mode: ScrollMode,
    gap: i32,
    pause: Duration,

    text_size: i32,
    content_size: i32,

    offset: f64,
    /// Travel direction for bounce modes.
    forward: bool,
    /// Remaining hold time at an end (pause_ends only).
    hold: Duration,
    last_tick: Option<Instant>,
}

impl ScrollAnimator {
    pub fn new(
        speed: f64,
        direction: ScrollDirection,
        mode: ScrollMode,
        gap: i32,
        pause: Duration,
    ) -> Self {
        Self {
            speed: speed.max(0.0),
            direction,
            mode,
            gap: gap.max(0),
            pause,
            text_size: 0,
            content_size: 0,
            offset: 0.0,
            forward: true,
            hold: Duration::ZERO,
            last_tick: None,
        }
    }

    pub fn from_config(config: &ScrollConfig) -> Self {
        Self::new(
            config.speed,
            config.direction,
            config.mode,
            config.gap,
            Duration::from_millis(config.pause_ms),
        )
    }

    #[inline]
    pub const fn direction(&self) -> ScrollDirection { self.direction }

    /// Set text and content sizes along the scroll axis.
    ///
    /// A change in text size restarts the animation.
    pub fn set_extent(
        &mut self,
        text_size: i32,
        content_size: i32,
    ) {
        if text_size != self.text_size {
            self.reset();
        }
        self.text_size = text_size;
        self.content_size = content_size;
    }

    /// True when the text does not fit and needs to move.
    #[inline]
    pub const fn needs_scroll(&self) -> bool { self.text_size > self.content_size }

    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.forward = true;
        self.hold = Duration::ZERO;
    }

    /// Current offset in whole pixels.
    #[inline]
    pub fn offset(&self) -> i32 { self.offset.floor() as i32 }

    /// Advance by wall time since the previous call.
    pub fn tick(
        &mut self,
        now: Instant,
    ) {
        let dt = self.last_tick.map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.update(dt);
    }

    /// Advance by `dt`.
    pub fn update(
        &mut self,
        dt: Duration,
    ) {
        if !self.needs_scroll() {
            self.reset();
            return;
        }
        match self.mode {
            ScrollMode::Continuous => {
                let period = f64::from(self.text_size + self.gap);
                self.offset = (self.offset + self.speed * dt.as_secs_f64()).rem_euclid(period);
            }
            ScrollMode::Bounce => self.bounce(dt.as_secs_f64(), false),
            ScrollMode::PauseEnds => {
                if self.hold > Duration::ZERO {
                    if dt < self.hold {
                        self.hold -= dt;
                        return;
                    }
                    let left = dt - self.hold;
                    self.hold = Duration::ZERO;
                    self.bounce(left.as_secs_f64(), true);
                } else {
                    self.bounce(dt.as_secs_f64(), true);
                }
            }
        }
    }

    fn bounce(
        &mut self,
        secs: f64,
        pause_at_ends: bool,
    ) {
        let max = f64::from((self.text_size - self.content_size).max(0));
        let step = self.speed * secs;
        if self.forward {
            self.offset += step;
            if self.offset >= max {
                self.offset = max;
                self.forward = false;
                if pause_at_ends {
                    self.hold = self.pause;
                }
            }
        } else {
            self.offset -= step;
            if self.offset <= 0.0 {
                self.offset = 0.0;
                self.forward = true;
                if pause_at_ends {
                    self.hold = self.pause;
                }
            }
        }
    }

    /// Axis coordinates at which to draw the text, given where the content
    /// box starts. Continuous mode returns a second copy trailing by
    /// `text + gap`.
    pub fn positions(
        &self,
        start: i32,
    ) -> (i32, Option<i32>) {
        if !self.needs_scroll() {
            return (start, None);
        }
        let offset = self.offset();
        match self.mode {
            ScrollMode::Continuous => {
                let period = self.text_size + self.gap;
                if self.direction.is_negative() {
                    (start - offset, Some(start - offset + period))
                } else {
                    (start + offset, Some(start + offset - period))
                }
            }
            ScrollMode::Bounce | ScrollMode::PauseEnds => {
                let max = self.text_size - self.content_size;
                if self.direction.is_negative() { (start - offset, None) } else { (start - max + offset, None) }
            }
        }
    }
}
