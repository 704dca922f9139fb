//! Presence events and the intervals reconstructed from them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Whether a user entered or exited the target channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceKind {
    Join,
    Leave,
}

impl PresenceKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
        }
    }
}

impl fmt::Display for PresenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A join or leave already resolved against the target channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub who: UserId,
    pub when: DateTime<Utc>,
    pub kind: PresenceKind,
}

impl PresenceEvent {
    pub const fn join(who: UserId, when: DateTime<Utc>) -> Self {
        Self {
            who,
            when,
            kind: PresenceKind::Join,
        }
    }

    pub const fn leave(who: UserId, when: DateTime<Utc>) -> Self {
        Self {
            who,
            when,
            kind: PresenceKind::Leave,
        }
    }
}

/// A continuous stretch during which a user was connected.
///
/// `joined` is inclusive, `left` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceInterval {
    pub who: UserId,
    pub joined: DateTime<Utc>,
    pub left: DateTime<Utc>,
}

impl PresenceInterval {
    pub fn duration(&self) -> Duration {
        self.left - self.joined
    }
}
