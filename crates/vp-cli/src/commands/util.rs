//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use vp_core::{PresenceInterval, Window, presence_report};

use crate::Config;
use crate::cli::QueryArgs;
use crate::source::{SourceFilter, open_input, read_embeds};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Resolves the observation window from `--hours` or `--start`/`--end`.
pub fn resolve_window(query: &QueryArgs, now: DateTime<Utc>) -> Result<Window> {
    if let Some(hours) = query.hours {
        return Window::ending_at(now, hours).context("invalid --hours");
    }

    let Some(start) = query.start.as_deref() else {
        anyhow::bail!("either --hours or --start is required");
    };
    let start = parse_datetime(start, now).context("invalid --start")?;
    let end = match query.end.as_deref() {
        Some(end) => parse_datetime(end, now).context("invalid --end")?,
        None => now,
    };
    Ok(Window::new(start, end)?)
}

/// Reads the relay export named by `query` and reconstructs its intervals.
pub fn load_intervals(query: &QueryArgs, config: &Config) -> Result<Vec<PresenceInterval>> {
    let window = resolve_window(query, Utc::now())?;
    tracing::debug!(start = %window.start(), end = %window.end(), channel = %query.channel, "resolved window");

    let pipeline = config.pipeline(query.min_duration)?;
    let filter = SourceFilter {
        author_id: config.relay_author_id,
        window,
    };
    let reader = open_input(&query.input)?;
    let embeds = read_embeds(reader, &filter)?;

    Ok(presence_report(embeds, &query.channel, &window, &pipeline))
}
