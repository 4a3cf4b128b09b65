//! Chip activation events.

use serde::{Deserialize, Serialize};

use super::title_case;
use crate::storage::{Row, RowError, TableKind, TableRow};

/// Chip code the fantasy API reports for the assistant-manager slot.
/// It is not a strategic chip and never counted.
pub const SENTINEL_CHIP: &str = "manager";

/// A strategic chip a manager can activate for one gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChipKind {
    #[serde(rename = "bboost")]
    BenchBoost,
    #[serde(rename = "freehit")]
    FreeHit,
    #[serde(rename = "3xc")]
    TripleCaptain,
    #[serde(rename = "wildcard")]
    Wildcard,
}

impl ChipKind {
    /// Display order.
    pub const ALL: [ChipKind; 4] = [
        ChipKind::BenchBoost,
        ChipKind::FreeHit,
        ChipKind::TripleCaptain,
        ChipKind::Wildcard,
    ];

    /// Code used by the fantasy API.
    pub fn code(&self) -> &'static str {
        match self {
            ChipKind::BenchBoost => "bboost",
            ChipKind::FreeHit => "freehit",
            ChipKind::TripleCaptain => "3xc",
            ChipKind::Wildcard => "wildcard",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChipKind::BenchBoost => "Bench Boost",
            ChipKind::FreeHit => "Free Hit",
            ChipKind::TripleCaptain => "Triple Captain",
            ChipKind::Wildcard => "Wildcard",
        }
    }
}

impl std::fmt::Display for ChipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, inclusive gameweek range used to bucket chip usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipPeriod {
    pub label: String,
    pub first: u32,
    pub last: u32,
}

impl ChipPeriod {
    pub fn new(label: impl Into<String>, first: u32, last: u32) -> Self {
        Self {
            label: label.into(),
            first,
            last,
        }
    }

    /// Split a season at `boundary`: `1..=boundary` and `boundary+1..=season_length`.
    pub fn halves(boundary: u32, season_length: u32) -> Vec<Self> {
        vec![
            Self::new(format!("GW 1-{boundary}"), 1, boundary),
            Self::new(
                format!("GW {}-{}", boundary + 1, season_length),
                boundary + 1,
                season_length,
            ),
        ]
    }

    pub fn contains(&self, event: u32) -> bool {
        (self.first..=self.last).contains(&event)
    }
}

/// One chip activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipEvent {
    pub entry_id: String,
    pub manager_name: String,
    pub event: u32,
    pub chip_kind: ChipKind,
}

impl ChipEvent {
    pub fn new(entry_id: &str, manager_name: &str, event: u32, chip_kind: ChipKind) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            manager_name: title_case(manager_name),
            event,
            chip_kind,
        }
    }
}

impl TableRow for ChipEvent {
    const TABLE: TableKind = TableKind::ChipUsage;
    const REQUIRED_COLUMNS: &'static [&'static str] = &["entry_id", "player_name", "event", "chip"];

    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
        let code = row.string("chip")?;
        if code == SENTINEL_CHIP {
            return Ok(None);
        }
        let chip_kind = ChipKind::from_code(&code).ok_or_else(|| RowError::InvalidField {
            column: "chip".to_string(),
            reason: format!("unknown chip '{code}'"),
        })?;

        Ok(Some(Self::new(
            &row.string("entry_id")?,
            &row.string("player_name")?,
            row.event("event")?,
            chip_kind,
        )))
    }
}
