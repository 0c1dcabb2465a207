//! Time-driven animation state for widgets.
//!
//! - [`scroll`]: overflowing text offsets (continuous, bounce, pause at ends)
//! - [`blink`]: half-period on/off visibility
//! - [`sprite`]: sleepy/wake pose sequencing
//!
//! Every animator can be advanced either by an explicit `dt` or by wall
//! time via `tick(now)`, so a late frame catches up instead of stuttering.

pub mod blink;
pub mod scroll;
pub mod sprite;

pub use blink::{BlinkAnimator, BlinkMode};
pub use scroll::{ScrollAnimator, ScrollDirection, ScrollMode};
pub use sprite::{SleepySprite, SpriteFrame};
