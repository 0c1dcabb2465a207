//! On/off blinking.
//!
//! The animator is visible during the first half of each period. In
//! `conditional` mode it only blinks while its condition is set (e.g. low
//! battery) and is steadily visible otherwise.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::BlinkConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkMode {
    Always,
    #[default]
    Conditional,
}

#[derive(Clone, Debug)]
pub struct BlinkAnimator {
    mode: BlinkMode,
    period: Duration,
    phase: Duration,
    condition: bool,
    last_tick: Option<Instant>,
}

impl BlinkAnimator {
    pub fn new(
        mode: BlinkMode,
        period: Duration,
    ) -> Self {
        Self {
            mode,
            period: period.max(Duration::from_millis(1)),
            phase: Duration::ZERO,
            condition: false,
            last_tick: None,
        }
    }

    pub fn from_config(config: &BlinkConfig) -> Self { Self::new(config.mode, Duration::from_millis(config.period_ms)) }

    /// Set the blink condition. Turning it on restarts the phase so the
    /// target starts visible.
    pub fn set_condition(
        &mut self,
        active: bool,
    ) {
        if active && !self.condition {
            self.phase = Duration::ZERO;
        }
        self.condition = active;
    }

    /// Whether the animator is currently cycling.
    #[inline]
    pub const fn is_blinking(&self) -> bool {
        match self.mode {
            BlinkMode::Always => true,
            BlinkMode::Conditional => self.condition,
        }
    }

    pub fn update(
        &mut self,
        dt: Duration,
    ) {
        let period = self.period.as_nanos();
        let phase = (self.phase.as_nanos() + dt.as_nanos()) % period;
        self.phase = Duration::from_nanos(phase as u64);
    }

    /// Advance by wall time since the previous call.
    pub fn tick(
        &mut self,
        now: Instant,
    ) {
        let dt = self.last_tick.map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.update(dt);
    }

    pub fn should_render(&self) -> bool { !self.is_blinking() || self.phase < self.period / 2 }
}
