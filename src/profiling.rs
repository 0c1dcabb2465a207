//! Frame metrics and a short log of recent compositor events.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = FrameMetrics::new();
//! let mut log = DebugLog::new();
//!
//! // In the frame loop:
//! let frame_start = Instant::now();
//! // ... update, render, compose ...
//! let render_time = frame_start.elapsed();
//! // ... transition, deliver ...
//! metrics.record_frame(frame_start.elapsed(), render_time, in_transition);
//!
//! // Notable events:
//! log.push("transition clock_wipe");
//! ```

use std::time::{Duration, Instant};

use heapless::{Deque, String};
use tracing::debug;

use crate::config::constants::METRICS_LOG_INTERVAL;

// =============================================================================
// Debug Log Configuration
// =============================================================================

/// Maximum number of log lines kept.
pub const LOG_BUFFER_SIZE: usize = 8;

/// Maximum characters per log line.
pub const LOG_LINE_LENGTH: usize = 48;

// =============================================================================
// Frame Metrics
// =============================================================================

/// Frame timing and error counters, updated once per frame.
pub struct FrameMetrics {
    /// Whole frame: update, render, compose, transition and delivery.
    pub frame_time_us: u32,
    /// Widget update + render + compose only.
    pub render_time_us: u32,

    pub frame_time_min_us: u32,
    pub frame_time_max_us: u32,
    /// Exponential moving average of the frame time.
    frame_time_avg_us: f32,

    /// Frames delivered since start.
    pub total_frames: u64,
    /// Frames that were a transition blend rather than the composed frame.
    pub transition_frames: u64,
    /// Widget renders that failed and were skipped.
    pub render_errors: u64,
    pub sink_errors: u64,

    start_time: Instant,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self {
            frame_time_us: 0,
            render_time_us: 0,
            frame_time_min_us: u32::MAX,
            frame_time_max_us: 0,
            frame_time_avg_us: 0.0,
            total_frames: 0,
            transition_frames: 0,
            render_errors: 0,
            sink_errors: 0,
            start_time: Instant::now(),
        }
    }

    /// Smoothing factor of the moving average.
    const EMA_ALPHA: f32 = 0.1;

    /// Record timing for one delivered frame.
    pub fn record_frame(
        &mut self,
        total_time: Duration,
        render_time: Duration,
        in_transition: bool,
    ) {
        let total_us = total_time.as_micros().min(u128::from(u32::MAX)) as u32;
        let render_us = render_time.as_micros().min(u128::from(u32::MAX)) as u32;

        self.frame_time_us = total_us;
        self.render_time_us = render_us;
        self.frame_time_min_us = self.frame_time_min_us.min(total_us);
        self.frame_time_max_us = self.frame_time_max_us.max(total_us);

        if self.total_frames == 0 {
            self.frame_time_avg_us = total_us as f32;
        } else {
            self.frame_time_avg_us =
                Self::EMA_ALPHA.mul_add(total_us as f32, (1.0 - Self::EMA_ALPHA) * self.frame_time_avg_us);
        }

        self.total_frames += 1;
        if in_transition {
            self.transition_frames += 1;
        }
    }

    #[inline]
    pub const fn frame_time_avg_us(&self) -> u32 { self.frame_time_avg_us as u32 }

    #[inline]
    pub const fn inc_render_errors(&mut self) { self.render_errors += 1; }

    #[inline]
    pub const fn inc_sink_errors(&mut self) { self.sink_errors += 1; }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Uptime as `HH:MM:SS`.
    pub fn uptime_string(&self) -> String<12> {
        let secs = self.uptime().as_secs();
        let mut s = String::new();
        for (i, part) in [secs / 3600, (secs % 3600) / 60, secs % 60].into_iter().enumerate() {
            if i > 0 {
                s.push(':').ok();
            }
            if part < 10 {
                s.push('0').ok();
            }
            push_u32(&mut s, part.min(u64::from(u32::MAX)) as u32);
        }
        s
    }

    /// Emit a summary every [`METRICS_LOG_INTERVAL`] frames.
    pub fn maybe_log(&self) {
        if self.total_frames == 0 || self.total_frames % METRICS_LOG_INTERVAL != 0 {
            return;
        }
        debug!(
            frames = self.total_frames,
            uptime = %self.uptime_string(),
            frame_us = self.frame_time_us,
            render_us = self.render_time_us,
            avg_us = self.frame_time_avg_us(),
            min_us = self.frame_time_min_us,
            max_us = self.frame_time_max_us,
            transition_frames = self.transition_frames,
            render_errors = self.render_errors,
            sink_errors = self.sink_errors,
            "frame metrics"
        );
    }
}

impl Default for FrameMetrics {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Debug Log Ring Buffer
// =============================================================================

/// The last [`LOG_BUFFER_SIZE`] event lines, oldest dropped first.
pub struct DebugLog {
    buffer: Deque<String<LOG_LINE_LENGTH>, LOG_BUFFER_SIZE>,
}

impl DebugLog {
    pub const fn new() -> Self { Self { buffer: Deque::new() } }

    /// Append `msg`, truncated to fit a line.
    pub fn push(
        &mut self,
        msg: &str,
    ) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }

        let mut line: String<LOG_LINE_LENGTH> = String::new();
        for c in msg.chars() {
            if line.push(c).is_err() {
                break;
            }
        }

        self.buffer.push_back(line).ok();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.buffer.iter().map(heapless::string::StringInner::as_str) }

    #[inline]
    pub const fn len(&self) -> usize { self.buffer.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }
}

impl Default for DebugLog {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Push a u32 in decimal without going through `format!`.
fn push_u32<const N: usize>(
    s: &mut String<N>,
    mut val: u32,
) {
    if val == 0 {
        s.push('0').ok();
        return;
    }

    let mut digits = [0u8; 10];
    let mut i = 0;
    while val > 0 {
        digits[i] = (val % 10) as u8;
        val /= 10;
        i += 1;
    }

    while i > 0 {
        i -= 1;
        s.push((b'0' + digits[i]) as char).ok();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_metrics_new() {
        let metrics = FrameMetrics::new();
        assert_eq!(metrics.total_frames, 0);
        assert_eq!(metrics.frame_time_min_us, u32::MAX);
        assert_eq!(metrics.frame_time_max_us, 0);
        assert_eq!(metrics.render_errors, 0);
    }

    #[test]
    fn test_record_frame_min_max_and_transitions() {
        let mut metrics = FrameMetrics::new();
        metrics.record_frame(Duration::from_micros(20_000), Duration::from_micros(15_000), false);
        metrics.record_frame(Duration::from_micros(15_000), Duration::from_micros(10_000), true);
        metrics.record_frame(Duration::from_micros(25_000), Duration::from_micros(20_000), true);

        assert_eq!(metrics.total_frames, 3);
        assert_eq!(metrics.transition_frames, 2);
        assert_eq!(metrics.frame_time_us, 25_000);
        assert_eq!(metrics.render_time_us, 20_000);
        assert_eq!(metrics.frame_time_min_us, 15_000);
        assert_eq!(metrics.frame_time_max_us, 25_000);
    }

    #[test]
    fn test_average_starts_at_first_sample() {
        let mut metrics = FrameMetrics::new();
        metrics.record_frame(Duration::from_micros(1000), Duration::ZERO, false);
        assert_eq!(metrics.frame_time_avg_us(), 1000, "First frame seeds the average");
        metrics.record_frame(Duration::from_micros(2000), Duration::ZERO, false);
        assert_eq!(metrics.frame_time_avg_us(), 1100, "EMA moves 10% toward the new sample");
    }

    #[test]
    fn test_error_counters() {
        let mut metrics = FrameMetrics::new();
        metrics.inc_render_errors();
        metrics.inc_render_errors();
        metrics.inc_sink_errors();
        assert_eq!((metrics.render_errors, metrics.sink_errors), (2, 1));
    }

    #[test]
    fn test_debug_log_ring_buffer() {
        let mut log = DebugLog::new();
        assert!(log.is_empty());
        for i in 0..LOG_BUFFER_SIZE {
            log.push(&format!("Message {i}"));
        }
        assert_eq!(log.len(), LOG_BUFFER_SIZE);

        log.push("New message");
        assert_eq!(log.len(), LOG_BUFFER_SIZE);
        let first = log.iter().next().expect("log has lines");
        assert!(first.starts_with("Message 1"), "Oldest line was dropped, got {first}");
    }

    #[test]
    fn test_debug_log_truncation() {
        let mut log = DebugLog::new();
        log.push(&"x".repeat(100));
        let stored = log.iter().next().expect("log has a line");
        assert_eq!(stored.len(), LOG_LINE_LENGTH);
    }

    #[test]
    fn test_uptime_string_format() {
        let uptime = FrameMetrics::new().uptime_string();
        assert_eq!(uptime.as_str(), "00:00:00");
    }

    #[test]
    fn test_push_u32() {
        for (value, expected) in [(0, "0"), (123, "123"), (9999, "9999"), (u32::MAX, "4294967295")] {
            let mut s: String<16> = String::new();
            push_u32(&mut s, value);
            assert_eq!(s.as_str(), expected);
        }
    }
}
