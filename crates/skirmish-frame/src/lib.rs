//! Frame pacing and motion prediction for Skirmish.
//!
//! Between authoritative updates from the server, the client advances
//! every player along its movement flags once per frame. This crate
//! provides both halves of that:
//!
//! - [`FrameScheduler`] decides *when* a frame happens and how much time
//!   passed since the last one.
//! - [`integrate`] / [`step`] decide *where* each player ends up.
//!
//! # Uncapped mode
//!
//! When `frame_rate_hz` is 0, [`FrameScheduler::wait_for_frame`] doesn't
//! sleep at all; it only yields to the runtime so other `select!`
//! branches get a turn. Elapsed time is then whatever the wall clock says.
//!
//! # Integration
//!
//! The scheduler is designed to sit inside the client's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         msg = conn.recv() => { /* dispatch into the session */ }
//!         frame = scheduler.wait_for_frame() => {
//!             skirmish_frame::step(
//!                 session.registry_mut().iter_mut(),
//!                 frame.elapsed_secs(),
//!                 &world,
//!             );
//!             scheduler.record_frame_end();
//!         }
//!     }
//! }
//! ```

mod world;

pub use world::{integrate, step, WorldConfig};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the frame scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frame rate in Hz. 0 = uncapped (frames run back to back).
    ///
    /// Default: 60, a typical display refresh rate.
    pub frame_rate_hz: u32,
    /// Budget warning threshold (0.0–1.0). Default: 0.80 (80%).
    /// A tracing warning is emitted when the work between
    /// `wait_for_frame` and `record_frame_end` exceeds this fraction of
    /// the frame budget.
    pub budget_warn_threshold: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            budget_warn_threshold: 0.80,
        }
    }
}

impl FrameConfig {
    /// Maximum supported frame rate.
    pub const MAX_FRAME_RATE_HZ: u32 = 240;

    /// Create a config for a specific frame rate with default settings.
    pub fn with_rate(frame_rate_hz: u32) -> Self {
        Self {
            frame_rate_hz,
            ..Default::default()
        }
    }

    /// Clamp any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`FrameScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.frame_rate_hz > Self::MAX_FRAME_RATE_HZ {
            warn!(
                rate = self.frame_rate_hz,
                max = Self::MAX_FRAME_RATE_HZ,
                "frame_rate_hz exceeds maximum, clamping"
            );
            self.frame_rate_hz = Self::MAX_FRAME_RATE_HZ;
        }
        if !(0.0..=1.0).contains(&self.budget_warn_threshold) {
            warn!(
                threshold = self.budget_warn_threshold,
                "budget_warn_threshold out of range, clamping"
            );
            // NaN fails `contains` and falls through to the default.
            self.budget_warn_threshold = if self.budget_warn_threshold.is_nan() {
                Self::default().budget_warn_threshold
            } else {
                self.budget_warn_threshold.clamp(0.0, 1.0)
            };
        }
        self
    }

    /// Duration of a single frame. Returns `None` when uncapped.
    pub fn frame_duration(&self) -> Option<Duration> {
        if self.frame_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.frame_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// Frame info (returned to caller each frame)
// ---------------------------------------------------------------------------

/// Information about a frame, returned by [`FrameScheduler::wait_for_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Monotonically increasing frame number (starts at 1).
    pub frame: u64,
    /// Wall-clock time since the previous frame. Zero for the first.
    ///
    /// Unlike a fixed simulation step, this is the real interval, so a
    /// late frame moves players further.
    pub elapsed: Duration,
    /// `true` if this frame fired late.
    pub overrun: bool,
    /// How many whole frames were skipped because of the overrun.
    pub frames_skipped: u64,
}

impl FrameInfo {
    /// `elapsed` in seconds, the unit [`integrate`] expects.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

// ---------------------------------------------------------------------------
// FrameClock
// ---------------------------------------------------------------------------

/// Elapsed-time bookkeeping for callers that drive frames themselves.
///
/// Each call to [`tick`](Self::tick) returns the seconds since the
/// previous call; the first call returns 0.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame at `now` and returns the seconds since the last one.
    ///
    /// A `now` earlier than the previous frame yields 0.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        elapsed.as_secs_f32()
    }

    /// Forgets the previous frame, so the next `tick` returns 0 again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Paces the client's frames.
///
/// The first frame fires immediately. After that, frames are spaced
/// `1 / frame_rate_hz` apart. A frame that wakes up late doesn't try to
/// make up the missed ones: the next frame is scheduled a full period
/// from now and the longer `elapsed` carries the lost time.
pub struct FrameScheduler {
    config: FrameConfig,
    frame_duration: Option<Duration>,
    frame_count: u64,
    /// When the next frame should fire. `None` before the first frame.
    next_frame: Option<Instant>,
    /// When the previous frame fired.
    last_frame: Option<Instant>,
    /// Set by `wait_for_frame`, consumed by `record_frame_end`.
    frame_start: Option<Instant>,
}

impl FrameScheduler {
    /// Create a new scheduler from config.
    pub fn new(config: FrameConfig) -> Self {
        let config = config.validated();
        let frame_duration = config.frame_duration();

        if frame_duration.is_none() {
            debug!("frame scheduler created uncapped");
        } else {
            debug!(
                rate_hz = config.frame_rate_hz,
                budget_ms = ?frame_duration.map(|d| d.as_secs_f64() * 1000.0),
                "frame scheduler created"
            );
        }

        Self {
            config,
            frame_duration,
            frame_count: 0,
            next_frame: None,
            last_frame: None,
            frame_start: None,
        }
    }

    /// Create a scheduler for a specific frame rate with default settings.
    pub fn with_rate(frame_rate_hz: u32) -> Self {
        Self::new(FrameConfig::with_rate(frame_rate_hz))
    }

    /// Wait until the next frame is due. Returns [`FrameInfo`] for it.
    ///
    /// Cancel-safe: if a `select!` drops this future before it resolves,
    /// no frame is counted and the deadline is kept.
    pub async fn wait_for_frame(&mut self) -> FrameInfo {
        match (self.next_frame, self.frame_duration) {
            (Some(next), Some(_)) => time::sleep_until(next).await,
            (_, None) => tokio::task::yield_now().await,
            (None, Some(_)) => {}
        }

        let now = Instant::now();
        self.frame_count += 1;
        self.frame_start = Some(now);

        let elapsed = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_frame = Some(now);

        let mut overrun = false;
        let mut frames_skipped = 0u64;

        if let Some(frame_dur) = self.frame_duration {
            if let Some(next) = self.next_frame {
                // Did we wake up significantly late?
                let late_by = now.saturating_duration_since(next);
                overrun = late_by > frame_dur / 10;
                if overrun {
                    frames_skipped =
                        (late_by.as_nanos() / frame_dur.as_nanos()) as u64;
                    if frames_skipped > 0 {
                        warn!(
                            frame = self.frame_count,
                            skipped = frames_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "frame overrun, skipping ahead"
                        );
                    }
                }
            }
            // Always schedule from now, not from the missed deadline.
            self.next_frame = Some(now + frame_dur);
        }

        trace!(
            frame = self.frame_count,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            overrun,
            "frame"
        );

        FrameInfo {
            frame: self.frame_count,
            elapsed,
            overrun,
            frames_skipped,
        }
    }

    /// Record that the work for the current frame has finished.
    ///
    /// Warns when the frame used more than the configured share of its
    /// budget. A no-op when uncapped or without a prior `wait_for_frame`.
    pub fn record_frame_end(&mut self) {
        let Some(start) = self.frame_start.take() else {
            return;
        };
        let Some(budget) = self.frame_duration else {
            return;
        };

        let spent = Instant::now().saturating_duration_since(start);
        let utilization = spent.as_secs_f64() / budget.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                frame = self.frame_count,
                spent_ms = spent.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "frame approaching budget limit"
            );
        }
    }

    /// Whether frames run back to back (frame rate 0).
    pub fn is_uncapped(&self) -> bool {
        self.frame_duration.is_none()
    }

    /// Frames produced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The configured frame rate in Hz.
    pub fn frame_rate_hz(&self) -> u32 {
        self.config.frame_rate_hz
    }

    /// The frame period, or `None` when uncapped.
    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_60hz() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.frame_rate_hz, 60);
        assert_eq!(
            cfg.frame_duration(),
            Some(Duration::from_secs_f64(1.0 / 60.0))
        );
    }

    #[test]
    fn test_validated_clamps_rate_and_threshold() {
        let cfg = FrameConfig {
            frame_rate_hz: 10_000,
            budget_warn_threshold: 3.0,
        }
        .validated();
        assert_eq!(cfg.frame_rate_hz, FrameConfig::MAX_FRAME_RATE_HZ);
        assert_eq!(cfg.budget_warn_threshold, 1.0);

        let cfg = FrameConfig {
            budget_warn_threshold: f64::NAN,
            ..FrameConfig::default()
        }
        .validated();
        assert_eq!(cfg.budget_warn_threshold, 0.80);
    }

    #[test]
    fn test_frame_config_deserializes_partial() {
        let cfg: FrameConfig =
            serde_json::from_str(r#"{"frame_rate_hz": 30}"#).unwrap();
        assert_eq!(cfg.frame_rate_hz, 30);
        assert_eq!(cfg.budget_warn_threshold, 0.80);
    }

    #[test]
    fn test_frame_clock_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();

        assert_eq!(clock.tick(t0), 0.0);
        assert_eq!(clock.tick(t0 + Duration::from_millis(250)), 0.25);
    }

    #[test]
    fn test_frame_clock_backwards_time_is_zero() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now() + Duration::from_secs(1);
        clock.tick(t0);
        assert_eq!(clock.tick(t0 - Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn test_frame_clock_reset() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.reset();
        assert_eq!(clock.tick(t0 + Duration::from_secs(3)), 0.0);
    }

    #[test]
    fn test_elapsed_secs() {
        let info = FrameInfo {
            frame: 2,
            elapsed: Duration::from_millis(500),
            overrun: false,
            frames_skipped: 0,
        };
        assert_eq!(info.elapsed_secs(), 0.5);
    }
}
