//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for caller-supplied values that violate a precondition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The window starts after it ends.
    #[error("window start {start} is after window end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The lookback length was negative.
    #[error("window length must not be negative, got {hours}h")]
    NegativeLength { hours: i64 },

    /// The window start is not a representable timestamp.
    #[error("window of {hours}h before {end} is out of range")]
    OutOfRange { end: DateTime<Utc>, hours: i64 },
}

/// An opaque user identifier as it appears in a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// An observation window `[start, end)`.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// Creates a window, rejecting inverted bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates the window covering the `hours` before `end`.
    pub fn ending_at(end: DateTime<Utc>, hours: i64) -> Result<Self, WindowError> {
        if hours < 0 {
            return Err(WindowError::NegativeLength { hours });
        }
        let start = Duration::try_hours(hours)
            .and_then(|length| end.checked_sub_signed(length))
            .ok_or(WindowError::OutOfRange { end, hours })?;
        Self::new(start, end)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` if `ts` falls inside `[start, end)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn user_id_parses_and_displays() {
        let id: UserId = "641596449355726858".parse().unwrap();
        assert_eq!(id.get(), 641_596_449_355_726_858);
        assert_eq!(id.to_string(), "641596449355726858");
    }

    #[test]
    fn user_id_rejects_overflow() {
        assert!("99999999999999999999999".parse::<UserId>().is_err());
    }

    #[test]
    fn user_id_serializes_as_integer() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 29, 11, 0, 0).unwrap();
        let err = Window::new(start, end).unwrap_err();
        assert_eq!(err, WindowError::Inverted { start, end });
    }

    #[test]
    fn window_allows_empty_range() {
        let at = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        let window = Window::new(at, at).unwrap();
        assert!(!window.contains(at));
    }

    #[test]
    fn window_ending_at_subtracts_hours() {
        let end = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        let window = Window::ending_at(end, 24).unwrap();
        assert_eq!(window.start(), Utc.with_ymd_and_hms(2025, 1, 28, 12, 0, 0).unwrap());
        assert_eq!(window.end(), end);
    }

    #[test]
    fn window_ending_at_rejects_huge_lengths() {
        let end = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        assert_eq!(
            Window::ending_at(end, i64::MAX).unwrap_err(),
            WindowError::OutOfRange { end, hours: i64::MAX }
        );
    }

    #[test]
    fn window_ending_at_rejects_negative_hours() {
        let end = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        assert_eq!(
            Window::ending_at(end, -1).unwrap_err(),
            WindowError::NegativeLength { hours: -1 }
        );
    }
}
