//! Interval reconstruction from a stream of presence events.
//!
//! # Algorithm Summary
//!
//! A single forward pass keeps, per user, the timestamp of the currently open
//! join and whether the user has been seen at all.
//!
//! 1. A join opens (or silently reopens) the user's interval.
//! 2. A leave closes the open interval. A leave for a user never seen before
//!    closes an interval starting at the window start, since the user was
//!    already connected when observation began. Any other unmatched leave is
//!    dropped.
//! 3. Joins still open at the end are closed at the window end, unless they
//!    are older than the stale threshold, in which case they are discarded.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::event::{PresenceEvent, PresenceInterval, PresenceKind};
use crate::types::{UserId, Window};

/// Configuration for interval reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    /// Joins left open for longer than this at window end are discarded.
    /// Default: 12 hours.
    pub stale_after: Duration,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::hours(12),
        }
    }
}

/// Reconstructs presence intervals with the default configuration.
///
/// See [`reconstruct_with`].
pub fn reconstruct<I>(events: I, window: &Window) -> Vec<PresenceInterval>
where
    I: IntoIterator<Item = PresenceEvent>,
{
    reconstruct_with(events, window, &ReconstructConfig::default())
}

/// Reconstructs presence intervals for `window` from `events`.
///
/// Events are consumed once, in the order given, which must be arrival order.
/// Intervals closed by a leave come out in the order of their leave; intervals
/// still open at window end follow, ordered by user id.
pub fn reconstruct_with<I>(
    events: I,
    window: &Window,
    config: &ReconstructConfig,
) -> Vec<PresenceInterval>
where
    I: IntoIterator<Item = PresenceEvent>,
{
    let mut open: BTreeMap<UserId, DateTime<Utc>> = BTreeMap::new();
    let mut seen: HashSet<UserId> = HashSet::new();
    let mut intervals = Vec::new();

    for event in events {
        match event.kind {
            PresenceKind::Join => {
                if let Some(previous) = open.insert(event.who, event.when) {
                    tracing::trace!(who = %event.who, %previous, "join replaced open join");
                }
            }
            PresenceKind::Leave => {
                if let Some(joined) = open.remove(&event.who) {
                    intervals.push(PresenceInterval {
                        who: event.who,
                        joined,
                        left: event.when,
                    });
                } else if !seen.contains(&event.who) {
                    intervals.push(PresenceInterval {
                        who: event.who,
                        joined: window.start(),
                        left: event.when,
                    });
                } else {
                    tracing::trace!(who = %event.who, when = %event.when, "dropping unmatched leave");
                }
            }
        }
        seen.insert(event.who);
    }

    for (who, joined) in open {
        if window.end() - joined > config.stale_after {
            tracing::debug!(%who, %joined, "discarding stale open join");
            continue;
        }
        intervals.push(PresenceInterval {
            who,
            joined,
            left: window.end(),
        });
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Minutes after the fixed test epoch.
    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn window(start: i64, end: i64) -> Window {
        Window::new(ts(start), ts(end)).unwrap()
    }

    fn u(id: u64) -> UserId {
        UserId::new(id)
    }

    fn interval(who: u64, joined: DateTime<Utc>, left: DateTime<Utc>) -> PresenceInterval {
        PresenceInterval {
            who: u(who),
            joined,
            left,
        }
    }

    #[test]
    fn join_then_leave_yields_one_interval() {
        let events = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::leave(u(1), ts(40)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(10), ts(40))]);
    }

    #[test]
    fn first_leave_starts_at_window_start() {
        let events = [PresenceEvent::leave(u(1), ts(30))];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(0), ts(30))]);
    }

    #[test]
    fn open_join_closes_at_window_end() {
        let events = [PresenceEvent::join(u(1), ts(30))];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(30), ts(60))]);
    }

    #[test]
    fn open_join_of_exactly_twelve_hours_is_kept() {
        let events = [PresenceEvent::join(u(1), ts(0))];
        let result = reconstruct(events, &window(0, 12 * 60));
        assert_eq!(result, vec![interval(1, ts(0), ts(12 * 60))]);
    }

    #[test]
    fn open_join_older_than_twelve_hours_is_discarded() {
        let events = [PresenceEvent::join(u(1), ts(0))];
        let result = reconstruct(events, &window(0, 12 * 60 + 1));
        assert!(result.is_empty());
    }

    #[test]
    fn stale_threshold_is_configurable() {
        let events = [PresenceEvent::join(u(1), ts(0))];
        let config = ReconstructConfig {
            stale_after: Duration::minutes(30),
        };
        assert!(reconstruct_with(events, &window(0, 60), &config).is_empty());
    }

    #[test]
    fn second_join_replaces_first() {
        let events = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::join(u(1), ts(20)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(20), ts(60))]);
    }

    #[test]
    fn second_join_replaces_first_before_leave() {
        let events = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::join(u(1), ts(20)),
            PresenceEvent::leave(u(1), ts(50)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(20), ts(50))]);
    }

    #[test]
    fn repeated_leave_is_dropped() {
        let events = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::leave(u(1), ts(20)),
            PresenceEvent::leave(u(1), ts(30)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(10), ts(20))]);
    }

    #[test]
    fn leave_after_first_leave_is_dropped() {
        let events = [
            PresenceEvent::leave(u(1), ts(10)),
            PresenceEvent::leave(u(1), ts(20)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(0), ts(10))]);
    }

    #[test]
    fn rejoin_after_leave_opens_new_interval() {
        let events = [
            PresenceEvent::leave(u(1), ts(10)),
            PresenceEvent::join(u(1), ts(20)),
            PresenceEvent::leave(u(1), ts(30)),
            PresenceEvent::join(u(1), ts(40)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(
            result,
            vec![
                interval(1, ts(0), ts(10)),
                interval(1, ts(20), ts(30)),
                interval(1, ts(40), ts(60)),
            ]
        );
    }

    #[test]
    fn same_instant_events_keep_input_order() {
        let events = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::leave(u(1), ts(10)),
        ];
        let result = reconstruct(events, &window(0, 60));
        assert_eq!(result, vec![interval(1, ts(10), ts(10))]);
    }

    #[test]
    fn interleaving_of_distinct_users_does_not_matter() {
        let a = [
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::leave(u(2), ts(15)),
            PresenceEvent::leave(u(1), ts(20)),
            PresenceEvent::join(u(2), ts(25)),
        ];
        let b = [
            PresenceEvent::leave(u(2), ts(15)),
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::join(u(2), ts(25)),
            PresenceEvent::leave(u(1), ts(20)),
        ];
        let key = |i: &PresenceInterval| (i.who, i.joined, i.left);
        let mut left = reconstruct(a, &window(0, 60));
        let mut right = reconstruct(b, &window(0, 60));
        left.sort_by_key(key);
        right.sort_by_key(key);
        assert_eq!(left, right);
    }

    #[test]
    fn trailing_open_intervals_are_ordered_by_user() {
        let events = [
            PresenceEvent::join(u(3), ts(10)),
            PresenceEvent::join(u(1), ts(20)),
            PresenceEvent::join(u(2), ts(30)),
        ];
        let who: Vec<u64> = reconstruct(events, &window(0, 60))
            .iter()
            .map(|i| i.who.get())
            .collect();
        assert_eq!(who, vec![1, 2, 3]);
    }

    #[test]
    fn intervals_never_overlap_per_user() {
        let events = [
            PresenceEvent::join(u(1), ts(5)),
            PresenceEvent::join(u(1), ts(10)),
            PresenceEvent::leave(u(1), ts(20)),
            PresenceEvent::leave(u(1), ts(25)),
            PresenceEvent::join(u(1), ts(30)),
            PresenceEvent::leave(u(1), ts(35)),
            PresenceEvent::join(u(1), ts(50)),
        ];
        let mut result = reconstruct(events, &window(0, 60));
        result.sort_by_key(|i| i.joined);
        for pair in result.windows(2) {
            assert!(pair[0].left <= pair[1].joined, "{pair:?}");
        }
    }

    #[test]
    fn accepts_a_lazy_iterator() {
        let events = (0..3).flat_map(|n| {
            [
                PresenceEvent::join(u(n), ts(n as i64 * 10)),
                PresenceEvent::leave(u(n), ts(n as i64 * 10 + 5)),
            ]
        });
        assert_eq!(reconstruct(events, &window(0, 60)).len(), 3);
    }

    #[test]
    fn no_events_yield_no_intervals() {
        assert!(reconstruct(std::iter::empty(), &window(0, 60)).is_empty());
    }
}
