//! Widget contract.
//!
//! A widget owns a fixed rectangle on the display. Each frame the compositor
//! calls [`Widget::update`] then [`Widget::render`]; `render` returns a canvas
//! of exactly `position.w x position.h`, or `None` while hidden.
//!
//! Widgets that sample slow sources run pollers (see [`spawn_poller`]) which
//! publish into an `RwLock`-guarded state. `render` clones a snapshot under
//! the read lock and draws after releasing it.

pub mod base;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, warn};

pub use self::base::{BaseWidget, ContentArea, Style};
use crate::canvas::GrayCanvas;
use crate::config::Position;
use crate::config::constants::READER_TIMEOUT;
use crate::error::WidgetError;

pub trait Widget: Send + Sync {
    fn base(&self) -> &BaseWidget;

    fn id(&self) -> &str { self.base().id() }

    fn position(&self) -> Position { self.base().position() }

    fn style(&self) -> Style { self.base().style() }

    /// Sample data sources and refresh internal state. Must not block on I/O.
    fn update(&self) -> Result<(), WidgetError> { Ok(()) }

    /// Draw the widget, or `None` when hidden this frame.
    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError>;

    /// Start background pollers; they exit when `shutdown` flips to `true`.
    fn start_pollers(
        &self,
        _shutdown: &watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        Vec::new()
    }

    /// Release reader handles. Safe to call more than once.
    fn stop(&self) { self.base().stop_once(|| {}); }
}

// =============================================================================
// Shared state helpers
// =============================================================================

/// Read guard that survives a poisoned lock; the data is plain values.
#[inline]
pub fn read_state<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> { lock.read().unwrap_or_else(PoisonError::into_inner) }

#[inline]
pub fn write_state<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> { lock.write().unwrap_or_else(PoisonError::into_inner) }

/// Animator state touched only from the render thread.
#[inline]
pub fn lock_state<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> { lock.lock().unwrap_or_else(PoisonError::into_inner) }

/// Clone the current state out of the lock.
#[inline]
pub fn snapshot<T: Clone>(lock: &RwLock<T>) -> T { read_state(lock).clone() }

// =============================================================================
// Pollers
// =============================================================================

/// Run `poll` on a blocking thread every `period` until shutdown.
///
/// Each call is bounded by [`READER_TIMEOUT`]; a call that overruns is
/// logged and the next tick proceeds. Missed ticks are skipped, never
/// bunched up.
pub fn spawn_poller<F>(
    widget_id: &str,
    period: Duration,
    shutdown: &watch::Receiver<bool>,
    poll: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let widget_id = widget_id.to_string();
    let mut shutdown = shutdown.clone();
    let poll = Arc::new(poll);

    tokio::spawn(async move {
        debug!(widget = %widget_id, ?period, "poller started");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let job = Arc::clone(&poll);
                    let call = tokio::task::spawn_blocking(move || job());
                    match timeout(READER_TIMEOUT, call).await {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => warn!(widget = %widget_id, error = %err, "poll task failed"),
                        Err(_) => warn!(widget = %widget_id, timeout_ms = READER_TIMEOUT.as_millis() as u64, "poll call timed out"),
                    }
                }
            }
        }
        debug!(widget = %widget_id, "poller stopped");
    })
}
