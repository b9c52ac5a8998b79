//! Terminal summaries of snapshots, updates and stored history.
//!
//! Formatting lives here so the update and storage code stay free of
//! presentation details.

use crate::domain::{Dataset, Snapshot, format_date_key};
use crate::update::{Mutation, UpdateReport};

/// Fetched values, one row per metric.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Snapshot captured {}\n",
        snapshot.captured_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&header(&["series", "value", "unit"]));
    for obs in &snapshot.observations {
        out.push_str(
            format!("{:<34} {:>14} {:<8}", obs.metric.title(), obs.value.to_string(), obs.unit).trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Per-group outcome of one update run.
pub fn format_update_summary(report: &UpdateReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Update for {}\n", format_date_key(report.snapshot.date())));
    out.push_str(&header(&["group", "result", "date"]));
    for outcome in &report.outcomes {
        let date = match outcome.mutation {
            Mutation::Keep => "-".to_string(),
            _ => format_date_key(outcome.date),
        };
        out.push_str(format!("{:<34} {:>14} {:<8}", outcome.label, outcome.mutation.as_str(), date).trim_end());
        out.push('\n');
    }
    out
}

/// Latest stored record of every series.
pub fn format_latest(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&header(&["series", "value", "date", "records"]));
    for series in dataset.iter() {
        let (value, date) = match series.last() {
            Some(r) => (format!("{} {}", r.value, series.unit), format_date_key(r.date)),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(
            format!(
                "{:<34} {:>14} {:<8} {:>7}",
                series.metric.title(),
                value,
                date,
                series.records.len()
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn header(cols: &[&str]) -> String {
    let widths = [34usize, 14, 8, 7];
    let mut names = String::new();
    let mut rule = String::new();
    for (i, col) in cols.iter().enumerate() {
        let w = widths[i.min(widths.len() - 1)];
        if i > 0 {
            names.push(' ');
            rule.push(' ');
        }
        if i == 1 {
            names.push_str(&format!("{col:>w$}"));
        } else {
            names.push_str(&format!("{col:<w$}"));
        }
        rule.push_str(&"-".repeat(w));
    }
    format!("{}\n{}\n", names.trim_end(), rule)
}
