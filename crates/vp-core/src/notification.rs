//! Parsing of relay notification text into presence events.
//!
//! The relay posts one embed per voice state change, with a description in
//! one of three shapes:
//!
//! - `<@123> joined **channel**.`
//! - `<@123> left **channel**.`
//! - `<@123> moved from **a** to **b**.`
//!
//! Mentions may carry the `!` nickname marker (`<@!123>`) and must use ASCII
//! digits; ids in other scripts are not recognised. Channel names are
//! limited to word characters. Matching is anchored at the start of the text
//! only, and the character following the closing `**` may be anything.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};

use crate::event::{PresenceEvent, PresenceKind};
use crate::types::UserId;

static JOINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A<@!?(?P<uid>[0-9]+)> joined \*\*(?P<chan>\w+)\*\*.").unwrap()
});

static LEFT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A<@!?(?P<uid>[0-9]+)> left \*\*(?P<chan>\w+)\*\*.").unwrap());

static MOVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A<@!?(?P<uid>[0-9]+)> moved from \*\*(?P<from>\w+)\*\* to \*\*(?P<to>\w+)\*\*.")
        .unwrap()
});

/// A recognised notification, before it is related to a target channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Joined { who: UserId, channel: String },
    Left { who: UserId, channel: String },
    Moved { who: UserId, from: String, to: String },
}

impl Notification {
    /// Parses notification text, trying join, leave, then move.
    ///
    /// Returns `None` when no shape matches or the mention id does not fit
    /// in a `u64`.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(caps) = JOINED_RE.captures(text) {
            return Some(Self::Joined {
                who: user_id(&caps)?,
                channel: caps["chan"].to_string(),
            });
        }
        if let Some(caps) = LEFT_RE.captures(text) {
            return Some(Self::Left {
                who: user_id(&caps)?,
                channel: caps["chan"].to_string(),
            });
        }
        let caps = MOVED_RE.captures(text)?;
        Some(Self::Moved {
            who: user_id(&caps)?,
            from: caps["from"].to_string(),
            to: caps["to"].to_string(),
        })
    }

    /// The user the notification is about.
    pub const fn who(&self) -> UserId {
        match self {
            Self::Joined { who, .. } | Self::Left { who, .. } | Self::Moved { who, .. } => *who,
        }
    }

    /// Relates the notification to `target`, producing an event at `when`.
    ///
    /// A move reports its destination as the associated channel whichever
    /// direction it resolves to, and that channel must equal `target`. A move
    /// out of the target therefore resolves to a leave that is then rejected.
    pub fn resolve(&self, target: &str, when: DateTime<Utc>) -> Option<PresenceEvent> {
        let (kind, channel) = match self {
            Self::Joined { channel, .. } => (PresenceKind::Join, channel),
            Self::Left { channel, .. } => (PresenceKind::Leave, channel),
            Self::Moved { from, to, .. } => {
                if to == target {
                    (PresenceKind::Join, to)
                } else if from == target {
                    (PresenceKind::Leave, to)
                } else {
                    return None;
                }
            }
        };

        if channel != target {
            return None;
        }

        Some(PresenceEvent {
            who: self.who(),
            when,
            kind,
        })
    }
}

fn user_id(caps: &Captures<'_>) -> Option<UserId> {
    caps["uid"].parse().ok()
}

/// Classifies one raw record against `target`.
///
/// Records that do not parse, concern another channel, or lack a timestamp
/// yield `None`; unrelated chatter in the relay is expected.
pub fn classify(
    text: Option<&str>,
    timestamp: Option<DateTime<Utc>>,
    target: &str,
) -> Option<PresenceEvent> {
    let Some(text) = text else {
        tracing::trace!("skipping record without text");
        return None;
    };
    let Some(notification) = Notification::parse(text) else {
        tracing::trace!(text, "skipping unrecognised record");
        return None;
    };
    let Some(when) = timestamp else {
        tracing::trace!(text, "skipping record without timestamp");
        return None;
    };
    let event = notification.resolve(target, when);
    match &event {
        Some(event) => {
            tracing::trace!(who = %event.who, kind = %event.kind, %when, "classified record");
        }
        None => tracing::trace!(text, target, "record does not concern target channel"),
    }
    event
}
