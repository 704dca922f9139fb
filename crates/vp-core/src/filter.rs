//! Minimum duration filtering of reconstructed intervals.

use chrono::Duration;

use crate::event::PresenceInterval;

/// Intervals must last strictly longer than this to be reported.
pub const DEFAULT_MIN_DURATION: Duration = Duration::seconds(600);

/// Keeps intervals lasting strictly longer than `min`, preserving order.
pub fn filter_by_min_duration(
    intervals: Vec<PresenceInterval>,
    min: Duration,
) -> Vec<PresenceInterval> {
    intervals
        .into_iter()
        .filter(|interval| interval.duration() > min)
        .collect()
}
