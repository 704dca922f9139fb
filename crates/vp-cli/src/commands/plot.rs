//! Implementation of the `vp plot` command.
//!
//! Renders presence intervals as an SVG timeline: one lane per user in the
//! order users first appear, one bar per interval. Users without a configured
//! display name are left out of the chart.

use std::collections::HashMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, DurationRound, Utc};
use quick_xml::escape::escape;
use vp_core::{PresenceInterval, UserId};

use super::util::load_intervals;
use crate::Config;
use crate::cli::QueryArgs;

/// Lane colours, cycled by lane index.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const CHART_WIDTH: f64 = 960.0;
const LABEL_WIDTH: f64 = 160.0;
const LANE_HEIGHT: f64 = 24.0;
const BAR_HEIGHT: f64 = 16.0;
const MARGIN: f64 = 20.0;
const AXIS_HEIGHT: f64 = 30.0;
const GRID_HOURS: i64 = 6;

/// One row of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub who: UserId,
    pub name: String,
    pub spans: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

/// Runs the plot command.
pub fn run(query: &QueryArgs, config: &Config, output: &Path) -> Result<()> {
    let intervals = load_intervals(query, config)?;
    let lanes = build_lanes(&intervals, |who| config.display_name(who).map(str::to_string));

    let svg = render_svg(&lanes);
    fs::write(output, svg).with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(lanes = lanes.len(), path = %output.display(), "wrote timeline");
    Ok(())
}

/// Groups intervals into lanes in first-seen order.
///
/// Users for whom `resolve_name` returns `None` get no lane.
pub fn build_lanes<F>(intervals: &[PresenceInterval], mut resolve_name: F) -> Vec<Lane>
where
    F: FnMut(UserId) -> Option<String>,
{
    let mut lanes: Vec<Lane> = Vec::new();
    let mut slots: HashMap<UserId, Option<usize>> = HashMap::new();

    for interval in intervals {
        let slot = *slots.entry(interval.who).or_insert_with(|| {
            let name = resolve_name(interval.who)?;
            lanes.push(Lane {
                who: interval.who,
                name,
                spans: Vec::new(),
            });
            Some(lanes.len() - 1)
        });

        match slot {
            Some(slot) => lanes[slot].spans.push((interval.joined, interval.left)),
            None => tracing::debug!(who = %interval.who, "skipping user without display name"),
        }
    }

    lanes
}

/// Time range covered by all spans, widened to at least one hour.
fn time_range(lanes: &[Lane]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let spans = lanes.iter().flat_map(|lane| lane.spans.iter());
    let start = spans.clone().map(|(joined, _)| *joined).min()?;
    let end = spans.map(|(_, left)| *left).max()?;
    if end - start < Duration::hours(1) {
        return Some((start, start + Duration::hours(1)));
    }
    Some((start, end))
}

/// Renders lanes as a standalone SVG document.
#[allow(clippy::cast_precision_loss)]
pub fn render_svg(lanes: &[Lane]) -> String {
    let plot_height = LANE_HEIGHT * lanes.len() as f64;
    let width = LABEL_WIDTH + CHART_WIDTH + MARGIN * 2.0;
    let height = plot_height + AXIS_HEIGHT + MARGIN * 2.0;
    let left = MARGIN + LABEL_WIDTH;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="Noto Sans, sans-serif" font-size="11">"#
    )
    .unwrap();
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#).unwrap();

    let Some((start, end)) = time_range(lanes) else {
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">No presence recorded</text>"#,
            width / 2.0,
            height / 2.0
        )
        .unwrap();
        svg.push_str("</svg>\n");
        return svg;
    };

    let span_ms = (end - start).num_milliseconds() as f64;
    let x = |ts: DateTime<Utc>| left + CHART_WIDTH * (ts - start).num_milliseconds() as f64 / span_ms;

    // Gridlines on every sixth UTC hour.
    let step = Duration::hours(GRID_HOURS);
    let mut tick = start.duration_trunc(step).unwrap_or(start);
    if tick < start {
        tick += step;
    }
    while tick <= end {
        let tx = x(tick);
        writeln!(
            svg,
            r##"<line x1="{tx:.1}" y1="{MARGIN}" x2="{tx:.1}" y2="{:.1}" stroke="#dddddd"/>"##,
            MARGIN + plot_height
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text x="{tx:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            MARGIN + plot_height + AXIS_HEIGHT / 2.0,
            tick.format("%m-%d %H:%M")
        )
        .unwrap();
        tick += step;
    }

    for (idx, lane) in lanes.iter().enumerate() {
        let lane_top = MARGIN + LANE_HEIGHT * idx as f64;
        let colour = PALETTE[idx % PALETTE.len()];
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            left - 6.0,
            lane_top + LANE_HEIGHT / 2.0,
            escape(&lane.name)
        )
        .unwrap();
        for (joined, left_at) in &lane.spans {
            let x1 = x(*joined);
            let x2 = x(*left_at);
            writeln!(
                svg,
                r#"<rect x="{x1:.1}" y="{:.1}" width="{:.1}" height="{BAR_HEIGHT}" fill="{colour}"><title>{} {} to {}</title></rect>"#,
                lane_top + (LANE_HEIGHT - BAR_HEIGHT) / 2.0,
                (x2 - x1).max(0.0),
                escape(&lane.name),
                joined.to_rfc3339(),
                left_at.to_rfc3339()
            )
            .unwrap();
        }
    }

    svg.push_str("</svg>\n");
    svg
}
