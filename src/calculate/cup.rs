//! Cup bracket reconstruction.

use crate::models::{BracketMatch, CupBracket, CupMatch, Entrant, MatchOutcome, StageGroup};
use crate::snapshot::Snapshot;
use crate::storage::TableKind;

use super::{rejected_note, require_table, View};

const NO_CUP: &str = "Cup matches have not been published yet.";

/// Decide a fixture on points. Missing points on either side leave it pending.
pub fn decide(a: Option<f64>, b: Option<f64>) -> MatchOutcome {
    match (a, b) {
        (Some(a), Some(b)) if a > b => MatchOutcome::EntrantA,
        (Some(a), Some(b)) if b > a => MatchOutcome::EntrantB,
        (Some(_), Some(_)) => MatchOutcome::Draw,
        _ => MatchOutcome::Pending,
    }
}

fn bracket_match(event: u32, a: &Entrant, b: &Entrant) -> BracketMatch {
    let outcome = decide(a.points, b.points);
    let winner = match outcome {
        MatchOutcome::EntrantA => Some(a.display_name().to_string()),
        MatchOutcome::EntrantB => Some(b.display_name().to_string()),
        MatchOutcome::Draw | MatchOutcome::Pending => None,
    };
    BracketMatch {
        event,
        entrant_a: a.clone(),
        entrant_b: b.clone(),
        outcome,
        winner,
    }
}

/// Group fixtures into stages in tournament order.
///
/// Stages are ordered by the gameweek they first appear in, never by their
/// label. Byes advance regardless of any points recorded against them.
pub fn build_bracket(matches: &[CupMatch]) -> CupBracket {
    let mut ordered: Vec<&CupMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| m.event);

    let mut stages: Vec<StageGroup> = Vec::new();
    for m in ordered {
        let idx = match stages.iter().position(|s| s.stage == m.stage) {
            Some(idx) => idx,
            None => {
                stages.push(StageGroup {
                    stage: m.stage.clone(),
                    first_event: m.event,
                    matches: Vec::new(),
                    byes: Vec::new(),
                });
                stages.len() - 1
            }
        };
        let stage = &mut stages[idx];

        match (&m.entrant_b, m.is_bye) {
            (Some(b), false) => stage.matches.push(bracket_match(m.event, &m.entrant_a, b)),
            _ => stage.byes.push(m.entrant_a.clone()),
        }
    }

    for stage in &mut stages {
        stage
            .byes
            .sort_by(|a, b| a.display_name().cmp(b.display_name()));
    }

    let champion = stages.last().and_then(|last| match last.matches.as_slice() {
        [final_match] if last.byes.is_empty() => final_match.winner.clone(),
        _ => None,
    });

    CupBracket { stages, champion }
}

pub fn cup_view(snapshot: &Snapshot) -> View<CupBracket> {
    let table = match require_table(&snapshot.cup, NO_CUP) {
        Ok(t) => t,
        Err(view) => return view,
    };
    let notes: Vec<String> = rejected_note(TableKind::CupMatches, table)
        .into_iter()
        .collect();

    let bracket = build_bracket(&table.rows);
    if bracket.is_empty() {
        return View::no_data(NO_CUP).with_notes(notes);
    }
    View::ready(bracket).with_notes(notes)
}
