//! End-to-end presence pipeline: classify, reconstruct, filter.

use chrono::{DateTime, Duration, Utc};

use crate::event::PresenceInterval;
use crate::filter::{DEFAULT_MIN_DURATION, filter_by_min_duration};
use crate::notification::classify;
use crate::reconstruct::{ReconstructConfig, reconstruct_with};
use crate::types::Window;

/// A raw relay record suitable for classification.
///
/// This trait allows the pipeline to work with different record sources
/// (e.g., messages read from an export file, or test fixtures).
pub trait NotificationRecord {
    /// Returns the notification text, if the record carries any.
    fn text(&self) -> Option<&str>;

    /// Returns the notification timestamp, if the record carries one.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Intervals must last strictly longer than this.
    /// Default: 600 seconds.
    pub min_duration: Duration,

    pub reconstruct: ReconstructConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            reconstruct: ReconstructConfig::default(),
        }
    }
}

/// Computes the presence intervals in `target` over `window`.
///
/// Records are classified lazily and consumed once, in arrival order.
pub fn presence_report<R, I>(
    records: I,
    target: &str,
    window: &Window,
    config: &PipelineConfig,
) -> Vec<PresenceInterval>
where
    R: NotificationRecord,
    I: IntoIterator<Item = R>,
{
    let events = records
        .into_iter()
        .filter_map(|record| classify(record.text(), record.timestamp(), target));
    let intervals = reconstruct_with(events, window, &config.reconstruct);
    let total = intervals.len();
    let kept = filter_by_min_duration(intervals, config.min_duration);
    tracing::debug!(
        target_channel = target,
        total,
        kept = kept.len(),
        "reconstructed presence intervals"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::TimeZone;

    struct TestRecord {
        text: Option<&'static str>,
        timestamp: Option<DateTime<Utc>>,
    }

    impl NotificationRecord for TestRecord {
        fn text(&self) -> Option<&str> {
            self.text
        }

        fn timestamp(&self) -> Option<DateTime<Utc>> {
            self.timestamp
        }
    }

    fn record(text: &'static str, at: DateTime<Utc>) -> TestRecord {
        TestRecord {
            text: Some(text),
            timestamp: Some(at),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn join_and_leave_produce_one_interval() {
        let records = vec![
            record("<@1> joined **vc**.", t0()),
            record("<@1> left **vc**.", t0() + Duration::seconds(3600)),
        ];
        let window = Window::new(t0() - Duration::hours(1), t0() + Duration::hours(2)).unwrap();

        let intervals = presence_report(records, "vc", &window, &PipelineConfig::default());

        assert_eq!(
            intervals,
            vec![PresenceInterval {
                who: UserId::new(1),
                joined: t0(),
                left: t0() + Duration::seconds(3600),
            }]
        );
    }

    #[test]
    fn noise_and_short_visits_are_dropped() {
        let records = vec![
            record("good morning", t0()),
            TestRecord {
                text: None,
                timestamp: Some(t0()),
            },
            TestRecord {
                text: Some("<@3> joined **vc**."),
                timestamp: None,
            },
            record("<@2> joined **other**.", t0()),
            record("<@1> joined **vc**.", t0()),
            record("<@1> left **vc**.", t0() + Duration::minutes(5)),
            record("<@4> moved from **lobby** to **vc**.", t0()),
            record("<@4> left **vc**.", t0() + Duration::minutes(30)),
        ];
        let window = Window::ending_at(t0() + Duration::hours(1), 2).unwrap();

        let intervals = presence_report(records, "vc", &window, &PipelineConfig::default());

        assert_eq!(
            intervals,
            vec![PresenceInterval {
                who: UserId::new(4),
                joined: t0(),
                left: t0() + Duration::minutes(30),
            }]
        );
    }

    #[test]
    fn min_duration_is_configurable() {
        let records = vec![
            record("<@1> joined **vc**.", t0()),
            record("<@1> left **vc**.", t0() + Duration::minutes(5)),
        ];
        let window = Window::ending_at(t0() + Duration::hours(1), 2).unwrap();
        let config = PipelineConfig {
            min_duration: Duration::minutes(1),
            ..Default::default()
        };

        assert_eq!(presence_report(records, "vc", &window, &config).len(), 1);
    }
}
