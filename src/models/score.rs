//! Weekly score records.

use serde::{Deserialize, Serialize};

use crate::storage::{Row, RowError, TableKind, TableRow};

/// Title-case a display name so spellings match across tables.
///
/// Every letter following a non-letter is upper-cased and every other
/// letter lower-cased, so "o'neil-SMITH" becomes "O'Neil-Smith".
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// One manager's result for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Title-cased manager name
    pub manager_name: String,

    /// Gameweek (1-based)
    pub event: u32,

    /// Points scored in this gameweek
    pub points: i64,

    /// Cumulative season points after this gameweek
    pub total_points: i64,
}

impl ScoreRecord {
    pub fn new(manager_name: &str, event: u32, points: i64, total_points: i64) -> Self {
        Self {
            manager_name: title_case(manager_name),
            event,
            points,
            total_points,
        }
    }
}

impl TableRow for ScoreRecord {
    const TABLE: TableKind = TableKind::WeeklyScores;
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["player_name", "event", "points", "total_points"];

    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
        Ok(Some(Self::new(
            &row.string("player_name")?,
            row.event("event")?,
            row.int("points")?,
            row.int("total_points")?,
        )))
    }

    fn dedup_key(&self) -> Option<String> {
        Some(format!("{}|{}", self.manager_name, self.event))
    }
}
