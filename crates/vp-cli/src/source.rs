//! Relay message source.
//!
//! Relay history is read from a JSON Lines export, one message per line, in
//! the order the messages were posted:
//!
//! ```json
//! {"author_id": 641596449355726858, "timestamp": "2025-01-29T12:00:00Z",
//!  "embeds": [{"description": "<@1> joined **vc**.", "timestamp": "2025-01-29T12:00:00Z"}]}
//! ```
//!
//! Only messages inside the requested window are passed on.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use vp_core::{NotificationRecord, Window};

/// One message from the relay channel.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayMessage {
    pub author_id: u64,
    /// When the message was posted.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

/// A structured payload attached to a relay message.
#[derive(Debug, Clone, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NotificationRecord for Embed {
    fn text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Which relay messages are worth classifying.
#[derive(Debug, Clone, Copy)]
pub struct SourceFilter {
    /// Only messages from this author are kept.
    pub author_id: u64,
    /// Messages posted, or embeds stamped, outside this window are skipped.
    pub window: Window,
}

impl SourceFilter {
    /// Returns the first embed of `message` if the message passes the filter.
    fn select(&self, message: RelayMessage) -> Option<Embed> {
        if message.author_id != self.author_id {
            return None;
        }
        if message.timestamp.is_some_and(|ts| !self.window.contains(ts)) {
            return None;
        }
        let embed = message.embeds.into_iter().next()?;
        if embed.timestamp.is_some_and(|ts| !self.window.contains(ts)) {
            tracing::trace!(timestamp = ?embed.timestamp, "skipping embed outside window");
            return None;
        }
        Some(embed)
    }
}

/// Opens `path` for reading, treating `-` as stdin.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("failed to open input: {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Reads relay messages and returns the embeds to classify, in arrival order.
///
/// Malformed lines are skipped; the relay export is expected to be noisy.
pub fn read_embeds<R: BufRead>(reader: R, filter: &SourceFilter) -> Result<Vec<Embed>> {
    let mut embeds = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let message: RelayMessage = match serde_json::from_str(trimmed) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(line = idx + 1, error = %e, "skipping malformed relay message");
                skipped += 1;
                continue;
            }
        };

        if let Some(embed) = filter.select(message) {
            embeds.push(embed);
        }
    }

    tracing::debug!(embeds = embeds.len(), skipped, "read relay messages");
    Ok(embeds)
}
