//! Terminal rendering for run results.
//!
//! - Headline counts (vehicles today, added, removed, excluded)
//! - Added and removed groups, newest model year first
//! - Exclusions listed when the run dropped records

use crate::aggregate::GroupSummary;
use crate::run::RunOutcome;
use crate::snapshot::{format_year, Snapshot};
use crate::store::diff::DiffResult;

pub fn render(outcome: &RunOutcome) -> String {
    let mut output = String::new();

    output.push_str(&format!("Inventory for {}\n", outcome.date));
    output.push_str(&format!("Vehicles today: {}\n", outcome.snapshot.len()));
    output.push_str(&summary_line(&outcome.diff, &outcome.added_groups, &outcome.removed_groups));

    if !outcome.exclusions.is_empty() {
        output.push_str(&format!("Excluded: {} record(s)\n", outcome.exclusions.len()));
    }

    output.push_str(&render_diff(&outcome.diff, &outcome.added_groups, &outcome.removed_groups));

    if !outcome.exclusions.is_empty() {
        output.push_str("\nExcluded\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for exclusion in &outcome.exclusions {
            let what = if exclusion.vin.is_empty() { &exclusion.url } else { &exclusion.vin };
            output.push_str(&format!(
                "  #{:<5} {:14} {}\n",
                exclusion.index,
                exclusion.reason.as_str(),
                what
            ));
        }
    }

    output
}

fn summary_line(diff: &DiffResult, added: &[GroupSummary], removed: &[GroupSummary]) -> String {
    format!(
        "Added: {} vehicle(s) in {} group(s); Removed: {} vehicle(s) in {} group(s)\n",
        diff.added.len(),
        added.len(),
        diff.removed.len(),
        removed.len()
    )
}

/// Grouped added/removed sections, shared by `run` and `diff`.
pub fn render_diff(diff: &DiffResult, added: &[GroupSummary], removed: &[GroupSummary]) -> String {
    let mut output = String::new();

    match diff.from_date {
        Some(from) => output.push_str(&format!("\nCompared with snapshot from {from}\n")),
        None => output.push_str("\nNo earlier snapshot; every vehicle counts as added\n"),
    }

    if diff.is_empty() {
        output.push_str("No changes detected.\n");
        return output;
    }

    output.push_str(&render_groups("Added", added));
    output.push_str(&render_groups("Removed", removed));
    output
}

/// Full diff output for two stored snapshots.
pub fn render_comparison(diff: &DiffResult, added: &[GroupSummary], removed: &[GroupSummary]) -> String {
    let mut output = String::new();
    if let Some(from) = diff.from_date {
        output.push_str(&format!("\nComparing snapshots:\n  From: {from}\n  To:   {}\n", diff.to_date));
    }
    output.push_str(&summary_line(diff, added, removed));
    output.push_str(&render_diff(diff, added, removed));
    output
}

fn render_groups(title: &str, groups: &[GroupSummary]) -> String {
    let mut output = format!("\n{title}\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');

    if groups.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    for group in groups {
        output.push_str(&format!(
            "  {:6} {:14} {:18} {:>4}  {}\n",
            format_year(group.year),
            truncate(&group.make, 14),
            truncate(&group.model, 18),
            group.count,
            group.vins.join(", ")
        ));
    }
    output
}

/// Stored inventory listing for `show`.
pub fn render_inventory(snapshot: &Snapshot) -> String {
    if snapshot.is_empty() {
        return format!("Snapshot {} holds no vehicles.\n", snapshot.date());
    }

    let mut output = format!("\nSnapshot {} ({} vehicles)\n", snapshot.date(), snapshot.len());
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for record in snapshot.sorted_records() {
        output.push_str(&format!(
            "  {:6} {:14} {:18} {}\n",
            record.year_text(),
            truncate(record.make.display(), 14),
            truncate(record.model.display(), 18),
            record.vin
        ));
    }
    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
