//! Season progress as reported by the fantasy API.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::storage::{DataError, Row, RowError, TableKind, TableRow};

/// Current gameweek and which gameweeks are finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekInfo {
    pub current_event: Option<u32>,
    /// Comma-separated gameweek numbers; empty means none finished
    pub finished_events: String,
}

impl GameweekInfo {
    pub fn new(current_event: Option<u32>, finished: &[u32]) -> Self {
        Self {
            current_event,
            finished_events: finished
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Parse the finished-gameweek list.
    pub fn finished(&self) -> Result<BTreeSet<u32>, DataError> {
        parse_event_list(&self.finished_events)
    }
}

/// Parse "1,2, 3" into a set. Blank input is the empty set.
pub fn parse_event_list(raw: &str) -> Result<BTreeSet<u32>, DataError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    if trimmed.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    trimmed
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .ok()
                .filter(|e| *e >= 1)
                .ok_or_else(|| DataError::MalformedEventList(raw.to_string()))
        })
        .collect()
}

impl TableRow for GameweekInfo {
    const TABLE: TableKind = TableKind::GameweekInfo;
    const REQUIRED_COLUMNS: &'static [&'static str] = &["finished_events"];

    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
        // Only the finished list drives filtering, so a bad current gameweek
        // is dropped rather than rejecting the row.
        let current_event = match row.raw("current_event") {
            None => None,
            Some(_) => row
                .event("current_event")
                .map_err(|e| warn!("{}: ignoring current gameweek: {}", Self::TABLE, e))
                .ok(),
        };
        Ok(Some(Self {
            current_event,
            finished_events: finished_text(row)?,
        }))
    }
}

/// The finished list may arrive as text, a single number or a JSON array;
/// it is kept as text and validated when used.
fn finished_text(row: Row<'_>) -> Result<String, RowError> {
    let raw = row.raw("finished_events");
    Ok(match raw {
        None => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(_) => row.opt_string("finished_events")?.unwrap_or_default(),
    })
}
