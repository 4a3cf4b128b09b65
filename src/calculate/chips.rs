//! Chip usage summaries.

use std::collections::BTreeMap;

use crate::models::{
    ChipCounts, ChipEvent, ChipKind, ChipPeriod, ChipSummary, ChipTimelinePoint, PeriodChips,
    ScoreRecord,
};
use crate::snapshot::Snapshot;
use crate::storage::TableKind;

use super::{is_selected, rejected_note, require_table, LeagueSettings, View};

const NO_CHIPS: &str = "No chip usage data available.";

#[derive(Default)]
struct ManagerTally {
    counts: ChipCounts,
    periods: Vec<ChipCounts>,
    total_points: i64,
}

/// Chip usage per manager, ranked by season points.
///
/// Managers from either table appear, so someone who never played a chip
/// still gets a row with "none" summaries. Ranking is by the highest
/// `total_points` recorded for the manager, ties by name.
pub fn summarize_chips(
    chips: &[ChipEvent],
    scores: &[ScoreRecord],
    periods: &[ChipPeriod],
) -> Vec<ChipSummary> {
    let mut tallies: BTreeMap<&str, ManagerTally> = BTreeMap::new();
    let blank = || ManagerTally {
        periods: vec![ChipCounts::default(); periods.len()],
        ..Default::default()
    };

    for record in scores {
        let tally = tallies
            .entry(record.manager_name.as_str())
            .or_insert_with(blank);
        tally.total_points = tally.total_points.max(record.total_points);
    }

    for chip in chips {
        let tally = tallies
            .entry(chip.manager_name.as_str())
            .or_insert_with(blank);
        tally.counts.record(chip.chip_kind);
        for (period, counts) in periods.iter().zip(tally.periods.iter_mut()) {
            if period.contains(chip.event) {
                counts.record(chip.chip_kind);
            }
        }
    }

    let mut rows: Vec<(&str, ManagerTally)> = tallies.into_iter().collect();
    rows.sort_by(|a, b| b.1.total_points.cmp(&a.1.total_points));

    rows.into_iter()
        .enumerate()
        .map(|(i, (manager, tally))| ChipSummary {
            rank: i as u32 + 1,
            manager: manager.to_string(),
            total_points: tally.total_points,
            counts: tally.counts,
            periods: periods
                .iter()
                .zip(tally.periods)
                .map(|(period, counts)| PeriodChips {
                    label: period.label.clone(),
                    summary: counts.summary(),
                    counts,
                })
                .collect(),
            is_selected: false,
        })
        .collect()
}

/// Activations per gameweek and chip kind, ordered by gameweek.
pub fn chip_timeline(chips: &[ChipEvent]) -> Vec<ChipTimelinePoint> {
    let mut counts: BTreeMap<(u32, ChipKind), u32> = BTreeMap::new();
    for chip in chips {
        *counts.entry((chip.event, chip.chip_kind)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((event, chip), count)| ChipTimelinePoint { event, chip, count })
        .collect()
}

pub fn chip_summary_view(
    snapshot: &Snapshot,
    settings: &LeagueSettings,
    selected: Option<&str>,
) -> View<Vec<ChipSummary>> {
    let chips = match require_table(&snapshot.chips, NO_CHIPS) {
        Ok(t) => t,
        Err(view) => return view,
    };
    let mut notes: Vec<String> = rejected_note(TableKind::ChipUsage, chips)
        .into_iter()
        .collect();

    let scores: &[ScoreRecord] = match &snapshot.scores {
        Ok(table) => &table.rows,
        Err(e) => {
            if !e.is_missing() {
                tracing::warn!("Chip ranking without scores: {}", e);
            }
            notes.push("Season totals are unavailable; everyone is ranked on zero points.".to_string());
            &[]
        }
    };

    let mut rows = summarize_chips(&chips.rows, scores, &settings.chip_periods);
    if rows.is_empty() {
        return View::no_data(NO_CHIPS).with_notes(notes);
    }
    for row in &mut rows {
        row.is_selected = is_selected(&row.manager, selected);
    }
    View::ready(rows).with_notes(notes)
}

pub fn chip_timeline_view(snapshot: &Snapshot) -> View<Vec<ChipTimelinePoint>> {
    let chips = match require_table(&snapshot.chips, NO_CHIPS) {
        Ok(t) => t,
        Err(view) => return view,
    };
    let points = chip_timeline(&chips.rows);
    if points.is_empty() {
        return View::no_data("No chips have been played yet.");
    }
    View::ready(points).with_notes(rejected_note(TableKind::ChipUsage, chips).into_iter().collect())
}
