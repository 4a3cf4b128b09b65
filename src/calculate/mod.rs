//! Aggregation engine.
//!
//! Computes the derived views from a snapshot:
//! - Weekly winners and the prize ledger
//! - Chip usage summaries and the chip timeline
//! - The cup bracket
//! - The prize fund reference
//!
//! Core functions take plain slices and are pure. The `*_view` wrappers read
//! a [`Snapshot`] and never fail: problems degrade to an empty result with a
//! status message.

pub mod chips;
pub mod cup;
pub mod prize_fund;
pub mod winners;

pub use chips::*;
pub use cup::*;
pub use prize_fund::*;
pub use winners::*;

use serde::Serialize;
use tracing::warn;

use crate::config::LeagueConfig;
use crate::models::{title_case, ChipPeriod};
use crate::snapshot::TableResult;
use crate::storage::{LoadedTable, TableKind};

/// League parameters the aggregations depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueSettings {
    /// Prize pool per gameweek
    pub weekly_prize: f64,
    pub chip_periods: Vec<ChipPeriod>,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self::from(&LeagueConfig::default())
    }
}

impl From<&LeagueConfig> for LeagueSettings {
    fn from(config: &LeagueConfig) -> Self {
        Self {
            weekly_prize: config.weekly_prize,
            chip_periods: config.periods(),
        }
    }
}

/// How trustworthy a view's data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Ready,
    /// Nothing to show yet; informational
    NoData,
    /// Usable, but some input was skipped or fell back
    Degraded,
    /// The view could not be computed
    Error,
}

/// A derived view plus a human-readable status for the consumer.
#[derive(Debug, Clone, Serialize)]
pub struct View<T> {
    pub status: ViewStatus,
    pub message: Option<String>,
    pub data: T,
}

impl<T> View<T> {
    pub fn ready(data: T) -> Self {
        Self {
            status: ViewStatus::Ready,
            message: None,
            data,
        }
    }

    /// Attach notes; a ready view with notes becomes degraded.
    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        if notes.is_empty() {
            return self;
        }
        if self.status == ViewStatus::Ready {
            self.status = ViewStatus::Degraded;
        }
        let mut all: Vec<String> = self.message.take().into_iter().collect();
        all.extend(notes);
        self.message = Some(all.join(" "));
        self
    }
}

impl<T: Default> View<T> {
    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            status: ViewStatus::NoData,
            message: Some(message.into()),
            data: T::default(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("View unavailable: {}", message);
        Self {
            status: ViewStatus::Error,
            message: Some(message),
            data: T::default(),
        }
    }
}

/// Unwrap a loaded table or turn its failure into the view to return.
pub(crate) fn require_table<'a, T, U: Default>(
    result: &'a TableResult<T>,
    missing_message: &str,
) -> Result<&'a LoadedTable<T>, View<U>> {
    match result {
        Ok(table) => Ok(table),
        Err(e) if e.is_missing() => Err(View::no_data(missing_message)),
        Err(e) => Err(View::error(e.to_string())),
    }
}

/// Note for rows that were skipped while loading.
pub(crate) fn rejected_note<T>(table: TableKind, loaded: &LoadedTable<T>) -> Option<String> {
    (loaded.rejected > 0).then(|| {
        format!(
            "{} malformed {} row(s) were skipped.",
            loaded.rejected, table
        )
    })
}

/// Whether a row belongs to the manager the consumer has selected.
pub(crate) fn is_selected(name: &str, selected: Option<&str>) -> bool {
    selected.is_some_and(|s| title_case(s) == name)
}
