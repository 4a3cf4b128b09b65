//! Weekly winners and the prize ledger.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{PrizeTotal, ScoreRecord, WeeklyWinnerRow};
use crate::snapshot::Snapshot;
use crate::storage::TableKind;

use super::{is_selected, rejected_note, require_table, LeagueSettings, View};

const NO_SCORES: &str = "Weekly scores have not been fetched yet.";
const NO_FINISHED: &str = "No gameweeks have finished yet.";

/// Top scorer(s) of every gameweek, each with an equal share of `pool`.
///
/// Ordered by gameweek, then manager name. Ties are exact: every manager
/// on the gameweek's maximum wins and the pool is divided between them.
pub fn weekly_winners(scores: &[ScoreRecord], pool: f64) -> Vec<WeeklyWinnerRow> {
    let mut by_event: BTreeMap<u32, Vec<&ScoreRecord>> = BTreeMap::new();
    for record in scores {
        by_event.entry(record.event).or_default().push(record);
    }

    let mut rows = Vec::new();
    for (event, records) in by_event {
        let Some(max_points) = records.iter().map(|r| r.points).max() else {
            continue;
        };
        let mut winners: Vec<&ScoreRecord> = records
            .into_iter()
            .filter(|r| r.points == max_points)
            .collect();
        winners.sort_by(|a, b| a.manager_name.cmp(&b.manager_name));

        let prize = pool / winners.len() as f64;
        rows.extend(winners.into_iter().map(|w| WeeklyWinnerRow {
            event,
            player_name: w.manager_name.clone(),
            points: w.points,
            prize,
            is_selected: false,
        }));
    }
    rows
}

/// Sum winnings per manager, richest first, ties by name.
pub fn prize_ledger(rows: &[WeeklyWinnerRow]) -> Vec<PrizeTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.player_name.as_str()).or_default() += row.prize;
    }

    let mut ledger: Vec<(&str, f64)> = totals.into_iter().collect();
    // Names are already ascending, so a stable sort on the amount keeps them
    // ordered within equal totals.
    ledger.sort_by(|a, b| b.1.total_cmp(&a.1));

    ledger
        .into_iter()
        .enumerate()
        .map(|(i, (name, prize))| PrizeTotal {
            rank: i as u32 + 1,
            player_name: name.to_string(),
            prize,
            is_selected: false,
        })
        .collect()
}

/// Keep only gameweeks in `finished`.
pub fn finished_only(scores: &[ScoreRecord], finished: &BTreeSet<u32>) -> Vec<ScoreRecord> {
    scores
        .iter()
        .filter(|r| finished.contains(&r.event))
        .cloned()
        .collect()
}

/// Weekly winners from the snapshot, restricted to finished gameweeks.
fn winner_rows<U: Default>(
    snapshot: &Snapshot,
    settings: &LeagueSettings,
) -> Result<(Vec<WeeklyWinnerRow>, Vec<String>), View<U>> {
    let table = require_table(&snapshot.scores, NO_SCORES)?;
    let mut notes: Vec<String> = rejected_note(TableKind::WeeklyScores, table)
        .into_iter()
        .collect();

    let rows = match snapshot.finished_events() {
        None => weekly_winners(&table.rows, settings.weekly_prize),
        Some(Ok(finished)) if finished.is_empty() => {
            return Err(View::no_data(NO_FINISHED).with_notes(notes));
        }
        Some(Ok(finished)) => weekly_winners(
            &finished_only(&table.rows, &finished),
            settings.weekly_prize,
        ),
        Some(Err(e)) => {
            tracing::warn!("Ignoring finished gameweek filter: {}", e);
            notes.push(format!("{e}; showing all gameweeks."));
            weekly_winners(&table.rows, settings.weekly_prize)
        }
    };
    Ok((rows, notes))
}

pub fn weekly_winner_view(
    snapshot: &Snapshot,
    settings: &LeagueSettings,
    selected: Option<&str>,
) -> View<Vec<WeeklyWinnerRow>> {
    let (mut rows, notes) = match winner_rows(snapshot, settings) {
        Ok(r) => r,
        Err(view) => return view,
    };
    if rows.is_empty() {
        return View::no_data("No gameweek scores recorded yet.").with_notes(notes);
    }
    for row in &mut rows {
        row.is_selected = is_selected(&row.player_name, selected);
    }
    View::ready(rows).with_notes(notes)
}

pub fn prize_ledger_view(
    snapshot: &Snapshot,
    settings: &LeagueSettings,
    selected: Option<&str>,
) -> View<Vec<PrizeTotal>> {
    let (rows, notes) = match winner_rows(snapshot, settings) {
        Ok(r) => r,
        Err(view) => return view,
    };
    let mut ledger = prize_ledger(&rows);
    if ledger.is_empty() {
        return View::no_data("No weekly prizes have been won yet.").with_notes(notes);
    }
    for total in &mut ledger {
        total.is_selected = is_selected(&total.player_name, selected);
    }
    View::ready(ledger).with_notes(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::ViewStatus;
    use crate::models::GameweekInfo;
    use crate::storage::{from_raw_rows, DataError, LoadedTable};
    use serde_json::json;
    use pretty_assertions::assert_eq;

    fn score(name: &str, event: u32, points: i64) -> ScoreRecord {
        ScoreRecord::new(name, event, points, points)
    }

    fn snapshot(scores: Vec<ScoreRecord>, gameweeks: Option<GameweekInfo>) -> Snapshot {
        let mut snap = Snapshot::empty();
        snap.scores = Ok(LoadedTable::new(scores));
        if let Some(info) = gameweeks {
            snap.gameweeks = Ok(LoadedTable::new(vec![info]));
        }
        snap
    }

    #[test]
    fn test_tied_winners_split_pool() {
        let scores = vec![score("A", 1, 80), score("B", 1, 80), score("C", 1, 70)];
        let rows = weekly_winners(&scores, 10.0);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name, "A");
        assert_eq!(rows[1].player_name, "B");
        assert!(rows.iter().all(|r| r.prize == 5.0 && r.points == 80));
        assert!(rows.iter().all(|r| r.player_name != "C"));
    }

    #[test]
    fn test_sole_winner_takes_pool() {
        let scores = vec![score("A", 1, 55), score("B", 1, 71)];
        let rows = weekly_winners(&scores, 10.0);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_name, "B");
        assert_eq!(rows[0].prize, 10.0);
    }

    #[test]
    fn test_split_sums_to_pool() {
        for n in 1..=7 {
            let scores: Vec<_> = (0..n).map(|i| score(&format!("M{i}"), 1, 60)).collect();
            let rows = weekly_winners(&scores, 10.0);

            assert_eq!(rows.len(), n);
            let total: f64 = rows.iter().map(|r| r.prize).sum();
            assert!((total - 10.0).abs() < 1e-9, "n={n} total={total}");
            assert!(rows.iter().all(|r| r.prize == 10.0 / n as f64));
        }
    }

    #[test]
    fn test_winners_ordered_by_event() {
        let scores = vec![
            score("A", 3, 40),
            score("B", 1, 90),
            score("A", 1, 20),
            score("B", 3, 10),
            score("C", 2, 66),
        ];
        let rows = weekly_winners(&scores, 10.0);
        let got: Vec<(u32, &str)> = rows
            .iter()
            .map(|r| (r.event, r.player_name.as_str()))
            .collect();

        assert_eq!(got, vec![(1, "B"), (2, "C"), (3, "A")]);
    }

    #[test]
    fn test_negative_scores_still_pick_max() {
        let scores = vec![score("A", 1, -4), score("B", 1, -2)];
        let rows = weekly_winners(&scores, 10.0);
        assert_eq!(rows[0].player_name, "B");
    }

    #[test]
    fn test_empty_scores() {
        assert!(weekly_winners(&[], 10.0).is_empty());
        assert!(prize_ledger(&[]).is_empty());
    }

    #[test]
    fn test_prize_ledger_ranks_and_ties() {
        let scores = vec![
            score("Cara", 1, 80),
            score("Abe", 1, 80),
            score("Bea", 2, 90),
            score("Cara", 3, 70),
            score("Abe", 3, 60),
        ];
        let ledger = prize_ledger(&weekly_winners(&scores, 10.0));
        let got: Vec<(u32, &str, f64)> = ledger
            .iter()
            .map(|t| (t.rank, t.player_name.as_str(), t.prize))
            .collect();

        assert_eq!(
            got,
            vec![(1, "Cara", 15.0), (2, "Bea", 10.0), (3, "Abe", 5.0)]
        );
    }

    #[test]
    fn test_prize_ledger_equal_totals_by_name() {
        let scores = vec![score("Zed", 1, 80), score("Amy", 2, 80)];
        let ledger = prize_ledger(&weekly_winners(&scores, 10.0));

        assert_eq!(ledger[0].player_name, "Amy");
        assert_eq!(ledger[1].player_name, "Zed");
        assert_eq!((ledger[0].rank, ledger[1].rank), (1, 2));
    }

    #[test]
    fn test_prize_ledger_idempotent() {
        let scores = vec![score("A", 1, 80), score("B", 1, 80), score("A", 2, 50)];
        let rows = weekly_winners(&scores, 10.0);

        assert_eq!(prize_ledger(&rows), prize_ledger(&rows));
    }

    #[test]
    fn test_view_marks_selected_user() {
        let snap = snapshot(vec![score("Ann", 1, 80), score("Bob", 1, 80)], None);
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), Some("bob"));

        assert_eq!(view.status, ViewStatus::Ready);
        assert!(!view.data[0].is_selected);
        assert!(view.data[1].is_selected);
    }

    #[test]
    fn test_view_no_finished_gameweeks() {
        let snap = snapshot(
            vec![score("Ann", 1, 80)],
            Some(GameweekInfo {
                current_event: Some(1),
                finished_events: String::new(),
            }),
        );
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);

        assert_eq!(view.status, ViewStatus::NoData);
        assert!(view.data.is_empty());
        assert_eq!(view.message.as_deref(), Some(NO_FINISHED));

        let ledger = prize_ledger_view(&snap, &LeagueSettings::default(), None);
        assert_eq!(ledger.status, ViewStatus::NoData);
    }

    #[test]
    fn test_view_filters_unfinished_gameweeks() {
        let snap = snapshot(
            vec![score("Ann", 1, 80), score("Bob", 2, 90)],
            Some(GameweekInfo::new(Some(2), &[1])),
        );
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);

        assert_eq!(view.data.len(), 1);
        assert_eq!(view.data[0].event, 1);
    }

    #[test]
    fn test_view_malformed_list_falls_back_to_all() {
        let snap = snapshot(
            vec![score("Ann", 1, 80), score("Bob", 2, 90)],
            Some(GameweekInfo {
                current_event: None,
                finished_events: "1,x".to_string(),
            }),
        );
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);

        assert_eq!(view.status, ViewStatus::Degraded);
        assert_eq!(view.data.len(), 2);
        assert!(view.message.unwrap().contains("showing all gameweeks"));
    }

    #[test]
    fn test_view_missing_and_broken_tables() {
        let snap = Snapshot::empty();
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);
        assert_eq!(view.status, ViewStatus::NoData);
        assert_eq!(view.message.as_deref(), Some(NO_SCORES));

        let mut snap = Snapshot::empty();
        snap.scores = Err(DataError::Schema {
            table: TableKind::WeeklyScores,
            column: "points".to_string(),
        });
        let view = prize_ledger_view(&snap, &LeagueSettings::default(), None);
        assert_eq!(view.status, ViewStatus::Error);
        assert!(view.data.is_empty());
    }

    #[test]
    fn test_view_reports_rejected_rows() {
        let mut snap = snapshot(vec![score("Ann", 1, 80)], None);
        if let Ok(table) = &mut snap.scores {
            table.rejected = 2;
        }
        let view = prize_ledger_view(&snap, &LeagueSettings::default(), None);

        assert_eq!(view.status, ViewStatus::Degraded);
        assert_eq!(view.data[0].prize, 10.0);
        assert!(view.message.unwrap().contains("2 malformed weekly_scores row(s)"));
    }

    #[test]
    fn test_view_gameweek_table_with_only_rejected_rows() {
        let mut snap = snapshot(vec![score("Ann", 1, 80), score("Bob", 2, 90)], None);
        snap.gameweeks = Ok(LoadedTable {
            rows: Vec::new(),
            rejected: 1,
            filtered: 0,
        });
        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);

        assert_eq!(view.status, ViewStatus::Degraded);
        assert_eq!(view.data.len(), 2);
        assert!(view.message.unwrap().contains("showing all gameweeks"));

        let ledger = prize_ledger_view(&snap, &LeagueSettings::default(), None);
        assert_eq!(ledger.status, ViewStatus::Degraded);
    }

    #[test]
    fn test_view_bad_current_event_still_honours_empty_list() {
        let raw = json!({"current_event": "gw1", "finished_events": ""});
        let mut snap = snapshot(vec![score("Ann", 1, 80)], None);
        snap.gameweeks = from_raw_rows(&[raw.as_object().cloned().unwrap()], 0);

        let view = weekly_winner_view(&snap, &LeagueSettings::default(), None);
        assert_eq!(view.status, ViewStatus::NoData);
        assert!(view.data.is_empty());
        assert_eq!(view.message.as_deref(), Some(NO_FINISHED));
    }
}
