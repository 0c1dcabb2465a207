//! Frame consumers.
//!
//! The compositor hands every finished framebuffer to an [`OutputSink`].
//! The physical transport lives outside this crate; here are a counting
//! [`NullSink`], a [`MemorySink`] for tests and, with the `simulator`
//! feature, an SDL window.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::canvas::GrayCanvas;
use crate::error::SinkError;

pub trait OutputSink: Send {
    fn deliver_frame(
        &mut self,
        frame: &GrayCanvas,
    ) -> Result<(), SinkError>;
}

/// Reject frames that do not match the display size.
fn check_size(
    frame: &GrayCanvas,
    width: u32,
    height: u32,
) -> Result<(), SinkError> {
    if frame.width() == width && frame.height() == height {
        Ok(())
    } else {
        Err(SinkError::SizeMismatch {
            expected_w: width,
            expected_h: height,
            actual_w: frame.width(),
            actual_h: frame.height(),
        })
    }
}

// =============================================================================
// Null
// =============================================================================

/// Discards frames, counting them.
#[derive(Debug)]
pub struct NullSink {
    width: u32,
    height: u32,
    frames: u64,
}

impl NullSink {
    pub const fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self { width, height, frames: 0 }
    }

    #[inline]
    pub const fn frames(&self) -> u64 { self.frames }
}

impl OutputSink for NullSink {
    fn deliver_frame(
        &mut self,
        frame: &GrayCanvas,
    ) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        self.frames += 1;
        Ok(())
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Shared view of the frames a [`MemorySink`] received.
#[derive(Clone, Debug, Default)]
pub struct FrameLog {
    inner: Arc<Mutex<FrameLogInner>>,
}

#[derive(Debug, Default)]
struct FrameLogInner {
    frames: VecDeque<GrayCanvas>,
    delivered: u64,
}

impl FrameLog {
    fn with<R>(
        &self,
        f: impl FnOnce(&mut FrameLogInner) -> R,
    ) -> R {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Total frames delivered, including ones no longer kept.
    pub fn delivered(&self) -> u64 { self.with(|log| log.delivered) }

    pub fn last(&self) -> Option<GrayCanvas> { self.with(|log| log.frames.back().cloned()) }

    /// Kept frames, oldest first.
    pub fn frames(&self) -> Vec<GrayCanvas> { self.with(|log| log.frames.iter().cloned().collect()) }
}

/// Keeps the most recent `keep` frames in memory.
#[derive(Debug)]
pub struct MemorySink {
    width: u32,
    height: u32,
    keep: usize,
    log: FrameLog,
}

impl MemorySink {
    pub fn new(
        width: u32,
        height: u32,
        keep: usize,
    ) -> Self {
        Self {
            width,
            height,
            keep: keep.max(1),
            log: FrameLog::default(),
        }
    }

    /// Handle that stays readable after the sink moves into a compositor.
    pub fn log(&self) -> FrameLog { self.log.clone() }
}

impl OutputSink for MemorySink {
    fn deliver_frame(
        &mut self,
        frame: &GrayCanvas,
    ) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        let keep = self.keep;
        self.log.with(|log| {
            if log.frames.len() == keep {
                log.frames.pop_front();
            }
            log.frames.push_back(frame.clone());
            log.delivered += 1;
        });
        Ok(())
    }
}

// =============================================================================
// Simulator
// =============================================================================

#[cfg(feature = "simulator")]
pub use simulator::SimulatorSink;

#[cfg(feature = "simulator")]
mod simulator {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, SyncSender, TrySendError};
    use std::thread;

    use embedded_graphics::pixelcolor::Gray8;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
    use tracing::{debug, info};

    use super::{OutputSink, check_size};
    use crate::canvas::GrayCanvas;
    use crate::error::SinkError;

    /// SDL window fed from a dedicated thread; frames that arrive while the
    /// window is still busy are dropped.
    pub struct SimulatorSink {
        width: u32,
        height: u32,
        tx: SyncSender<GrayCanvas>,
        closed: Arc<AtomicBool>,
    }

    impl SimulatorSink {
        pub fn open(
            width: u32,
            height: u32,
            scale: u32,
        ) -> Result<Self, SinkError> {
            let (tx, rx) = mpsc::sync_channel::<GrayCanvas>(1);
            let closed = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&closed);

            thread::Builder::new()
                .name("simulator-window".to_string())
                .spawn(move || {
                    let mut display: SimulatorDisplay<Gray8> = SimulatorDisplay::new(Size::new(width, height));
                    let settings = OutputSettingsBuilder::new().scale(scale.max(1)).build();
                    let mut window = Window::new("Panel Dashboard", &settings);
                    window.update(&display);
                    info!(width, height, scale, "simulator window open");

                    while let Ok(frame) = rx.recv() {
                        let pixels = frame.as_bytes().iter().enumerate().map(|(i, &v)| {
                            let x = (i % frame.stride()) as i32;
                            let y = (i / frame.stride()) as i32;
                            Pixel(Point::new(x, y), Gray8::new(v))
                        });
                        display.draw_iter(pixels).ok();
                        window.update(&display);
                        if window.events().any(|e| matches!(e, SimulatorEvent::Quit)) {
                            break;
                        }
                    }
                    flag.store(true, Ordering::Release);
                    debug!("simulator window closed");
                })
                .map_err(|e| SinkError::Unavailable(format!("cannot start window thread: {e}")))?;

            Ok(Self { width, height, tx, closed })
        }
    }

    impl OutputSink for SimulatorSink {
        fn deliver_frame(
            &mut self,
            frame: &GrayCanvas,
        ) -> Result<(), SinkError> {
            check_size(frame, self.width, self.height)?;
            if self.closed.load(Ordering::Acquire) {
                return Err(SinkError::Unavailable("simulator window closed".to_string()));
            }
            match self.tx.try_send(frame.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
                Err(TrySendError::Disconnected(_)) => Err(SinkError::Unavailable("simulator window closed".to_string())),
            }
        }
    }
}
