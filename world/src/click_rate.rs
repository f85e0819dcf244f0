//! Sliding-window click rate measurement used to resolve contests.

use std::{collections::VecDeque, time::Duration};

/// Length of the trailing window over which presses are counted.
pub(crate) const CLICK_WINDOW: Duration = Duration::from_secs(1);

/// Tracks press timestamps inside a hard one-second trailing window.
///
/// The reported rate is the number of retained presses, which approximates
/// presses per second. Timestamps are stored in non-decreasing order so
/// pruning only ever inspects the front of the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ClickRateTracker {
    timestamps: VecDeque<Duration>,
}

impl ClickRateTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a press that happened at `now`.
    pub(crate) fn record_event(&mut self, now: Duration) {
        let stamp = match self.timestamps.back() {
            Some(last) if *last > now => *last,
            _ => now,
        };
        self.timestamps.push_back(stamp);
    }

    /// Drops every press older than `now - CLICK_WINDOW`.
    pub(crate) fn prune(&mut self, now: Duration) {
        while let Some(oldest) = self.timestamps.front() {
            if now.saturating_sub(*oldest) > CLICK_WINDOW {
                let _ = self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of presses currently retained.
    #[must_use]
    pub(crate) fn rate(&self) -> u32 {
        u32::try_from(self.timestamps.len()).unwrap_or(u32::MAX)
    }

}

/// Maps a click rate onto contest progress in `0.0..=1.0`.
///
/// Thresholds below one click per second are treated as one so a
/// misconfigured tuning never divides by zero.
#[must_use]
pub(crate) fn contest_progress(rate: u32, rate_per_second_for_max: f32) -> f32 {
    let divisor = rate_per_second_for_max.max(1.0);
    (rate as f32 / divisor).clamp(0.0, 1.0)
}
