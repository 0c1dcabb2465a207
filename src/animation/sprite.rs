//! Sleepy/wake sprite sequencing for the activity widget.
//!
//! ```text
//! awake ──idle──▶ falling asleep (800 ms: drowsy, sleepy, asleep) ──▶ asleep
//!   ▲                                                                   │
//!   └────────── waking (400 ms: sleepy, drowsy) ◀──────activity─────────┘
//! ```
//!
//! While awake the sprite blinks for 200 ms at random 2-6 s intervals.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Timing
// =============================================================================

const FALL_ASLEEP: Duration = Duration::from_millis(800);
const WAKE_UP: Duration = Duration::from_millis(400);
const BLINK: Duration = Duration::from_millis(200);
const BLINK_INTERVAL_MS: std::ops::Range<u64> = 2000..6000;

const FALLING_FRAMES: [SpriteFrame; 3] = [SpriteFrame::Drowsy, SpriteFrame::Sleepy, SpriteFrame::Asleep];
const WAKING_FRAMES: [SpriteFrame; 2] = [SpriteFrame::Sleepy, SpriteFrame::Drowsy];

/// One pose of the sprite, from eyes open to closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteFrame {
    Awake,
    Blink,
    Drowsy,
    Sleepy,
    Asleep,
}

impl SpriteFrame {
    /// Eye opening in rows (0 = closed).
    pub const fn eye_open(self) -> i32 {
        match self {
            Self::Awake => 3,
            Self::Drowsy => 2,
            Self::Sleepy => 1,
            Self::Blink | Self::Asleep => 0,
        }
    }
}

pub struct SleepySprite {
    asleep: bool,
    /// When the last sleep/wake change happened; `None` before the first.
    changed_at: Option<Instant>,
    next_blink: Instant,
    blink_until: Option<Instant>,
    rng: StdRng,
}

impl SleepySprite {
    pub fn new(now: Instant) -> Self { Self::with_rng(StdRng::from_os_rng(), now) }

    /// Sprite with a caller-supplied RNG (deterministic tests).
    pub fn with_rng(
        mut rng: StdRng,
        now: Instant,
    ) -> Self {
        let next_blink = now + Duration::from_millis(rng.random_range(BLINK_INTERVAL_MS));
        Self {
            asleep: false,
            changed_at: None,
            next_blink,
            blink_until: None,
            rng,
        }
    }

    #[inline]
    pub const fn is_asleep(&self) -> bool { self.asleep }

    /// Switch state; repeated calls with the same value are ignored.
    pub fn set_asleep(
        &mut self,
        asleep: bool,
        now: Instant,
    ) {
        if asleep != self.asleep {
            self.asleep = asleep;
            self.changed_at = Some(now);
            self.blink_until = None;
            if !asleep {
                self.schedule_blink(now + WAKE_UP);
            }
        }
    }

    fn schedule_blink(
        &mut self,
        from: Instant,
    ) {
        self.next_blink = from + Duration::from_millis(self.rng.random_range(BLINK_INTERVAL_MS));
    }

    /// Pose to draw at `now`.
    pub fn frame(
        &mut self,
        now: Instant,
    ) -> SpriteFrame {
        let elapsed = self.changed_at.map(|t| now.saturating_duration_since(t));

        if self.asleep {
            return match elapsed {
                Some(e) if e < FALL_ASLEEP => {
                    let i = (e.as_millis() * FALLING_FRAMES.len() as u128 / FALL_ASLEEP.as_millis()) as usize;
                    FALLING_FRAMES[i.min(FALLING_FRAMES.len() - 1)]
                }
                _ => SpriteFrame::Asleep,
            };
        }

        if let Some(e) = elapsed
            && e < WAKE_UP
        {
            let i = (e.as_millis() * WAKING_FRAMES.len() as u128 / WAKE_UP.as_millis()) as usize;
            return WAKING_FRAMES[i.min(WAKING_FRAMES.len() - 1)];
        }

        if let Some(until) = self.blink_until {
            if now < until {
                return SpriteFrame::Blink;
            }
            self.blink_until = None;
        }
        if now >= self.next_blink {
            self.blink_until = Some(now + BLINK);
            self.schedule_blink(now + BLINK);
            return SpriteFrame::Blink;
        }
        SpriteFrame::Awake
    }
}
