//! Implementation of the `vp csv` command.
//!
//! Writes reconstructed presence intervals as CSV rows of
//! `user_id,joined,left`, with both bounds in RFC 3339.

use std::fmt::Write as _;
use std::fs;
use std::io::{Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use vp_core::PresenceInterval;

use super::util::load_intervals;
use crate::Config;
use crate::cli::QueryArgs;

/// Runs the csv command.
pub fn run(query: &QueryArgs, config: &Config, json: bool, output: Option<&Path>) -> Result<()> {
    let intervals = load_intervals(query, config)?;

    let rendered = if json {
        let mut s =
            serde_json::to_string_pretty(&intervals).context("failed to serialize intervals")?;
        s.push('\n');
        s
    } else {
        format_csv(&intervals)
    };

    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("failed to write to stdout")?,
    }

    tracing::debug!(rows = intervals.len(), "exported intervals");
    Ok(())
}

/// Formats intervals as CSV with a header row.
pub fn format_csv(intervals: &[PresenceInterval]) -> String {
    let mut output = String::new();
    writeln!(output, "user_id,joined,left").unwrap();
    for interval in intervals {
        writeln!(
            output,
            "{},{},{}",
            interval.who,
            interval.joined.to_rfc3339(),
            interval.left.to_rfc3339()
        )
        .unwrap();
    }
    output
}
