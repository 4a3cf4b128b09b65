//! Derived view models.
//!
//! Everything here is recomputed from a snapshot on every read and never
//! stored.

use serde::{Deserialize, Serialize};

use super::{ChipKind, Entrant, PrizeCategory};

/// A top scorer for one gameweek and their share of the prize pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWinnerRow {
    pub event: u32,
    pub player_name: String,
    pub points: i64,
    pub prize: f64,
    #[serde(default)]
    pub is_selected: bool,
}

/// A manager's summed weekly winnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTotal {
    pub rank: u32,
    pub player_name: String,
    pub prize: f64,
    #[serde(default)]
    pub is_selected: bool,
}

/// Activations per chip kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipCounts {
    pub bench_boost: u32,
    pub free_hit: u32,
    pub triple_captain: u32,
    pub wildcard: u32,
}

impl ChipCounts {
    pub fn get(&self, kind: ChipKind) -> u32 {
        match kind {
            ChipKind::BenchBoost => self.bench_boost,
            ChipKind::FreeHit => self.free_hit,
            ChipKind::TripleCaptain => self.triple_captain,
            ChipKind::Wildcard => self.wildcard,
        }
    }

    pub fn record(&mut self, kind: ChipKind) {
        let slot = match kind {
            ChipKind::BenchBoost => &mut self.bench_boost,
            ChipKind::FreeHit => &mut self.free_hit,
            ChipKind::TripleCaptain => &mut self.triple_captain,
            ChipKind::Wildcard => &mut self.wildcard,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        ChipKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// "none" when nothing was played, else e.g. "Bench Boost, Wildcard x2".
    pub fn summary(&self) -> String {
        if self.total() == 0 {
            return "none".to_string();
        }
        ChipKind::ALL
            .iter()
            .filter_map(|k| match self.get(*k) {
                0 => None,
                1 => Some(k.label().to_string()),
                n => Some(format!("{} x{}", k.label(), n)),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Chip usage inside one named gameweek period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodChips {
    pub label: String,
    pub counts: ChipCounts,
    pub summary: String,
}

/// One manager's chip usage and season standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipSummary {
    pub rank: u32,
    pub manager: String,
    pub total_points: i64,
    pub counts: ChipCounts,
    pub periods: Vec<PeriodChips>,
    #[serde(default)]
    pub is_selected: bool,
}

/// Number of activations of one chip kind in one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipTimelinePoint {
    pub event: u32,
    pub chip: ChipKind,
    pub count: u32,
}

/// Result of a regular (non-bye) cup fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    EntrantA,
    EntrantB,
    /// Both scored, level on points
    Draw,
    /// At least one side has no score yet
    Pending,
}

/// A regular fixture with its decided outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub event: u32,
    pub entrant_a: Entrant,
    pub entrant_b: Entrant,
    pub outcome: MatchOutcome,
    /// Display name of the winner, if decided
    pub winner: Option<String>,
}

/// All fixtures of one cup round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageGroup {
    pub stage: String,
    /// Earliest gameweek of this stage
    pub first_event: u32,
    pub matches: Vec<BracketMatch>,
    /// Entrants advancing without a fixture, sorted by name
    pub byes: Vec<Entrant>,
}

impl StageGroup {
    /// Everyone advancing from this stage so far.
    pub fn advancing(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter_map(|m| m.winner.clone())
            .chain(self.byes.iter().map(|e| e.display_name().to_string()))
            .collect()
    }
}

/// The cup in tournament order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CupBracket {
    pub stages: Vec<StageGroup>,
    /// Winner of the last stage once it is a single decided fixture
    pub champion: Option<String>,
}

impl CupBracket {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.champion.is_some()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.stage.as_str()).collect()
    }
}

/// One line of a prize fund section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeFundLine {
    pub label: Option<String>,
    pub amount: f64,
}

/// All prizes for one competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeFundSection {
    pub category: PrizeCategory,
    pub title: String,
    pub lines: Vec<PrizeFundLine>,
    pub total: f64,
}
