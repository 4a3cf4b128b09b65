//! Sync orchestrator.
//!
//! Rebuilds the raw tables from the fantasy API:
//! 1. Season progress from the bootstrap endpoint
//! 2. League members from the paged standings
//! 3. Each member's gameweek history and chip activations
//! 4. Write weekly scores, chip usage and gameweek info
//!
//! Everything is fetched before anything is written, and each table is
//! replaced atomically, so a failed sync leaves the previous tables intact.
//! The cup and prize fund tables come from elsewhere and are never touched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::fetch::{FantasyApi, StandingEntry};
use crate::models::{title_case, GameweekInfo};
use crate::storage::{JsonlWriter, StorageConfig, TableKind};

/// Errors that can occur during sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("League {0} has no members")]
    EmptyLeague(u64),
}

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub league_id: u64,

    /// Last gameweek to probe for chips when the API names no current one
    pub season_length: u32,

    /// Dry run mode (fetch but don't store)
    pub dry_run: bool,

    pub storage: StorageConfig,
}

impl SyncConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            league_id: config.league.league_id,
            season_length: config.league.season_length,
            dry_run: false,
            storage: StorageConfig::new(config.data_dir.clone()),
        }
    }
}

/// A `weekly_scores` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub entry_id: u64,
    pub player_name: String,
    pub team_name: String,
    pub event: u32,
    pub points: i64,
    pub total_points: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A `chip_usage` row. The chip code is stored as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipRow {
    pub entry_id: u64,
    pub player_name: String,
    pub team_name: String,
    pub event: u32,
    pub chip: String,
}

/// Result of a sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub managers: usize,
    pub score_rows: usize,
    pub chip_rows: usize,
    pub current_event: Option<u32>,
    pub finished_events: usize,
    pub written: bool,
    pub duration: Duration,
}

/// Sync orchestrator.
pub struct SyncOrchestrator {
    config: SyncConfig,
    api: Arc<dyn FantasyApi>,
}

impl SyncOrchestrator {
    pub fn new(config: SyncConfig, api: Arc<dyn FantasyApi>) -> Self {
        Self { config, api }
    }

    /// Run a single sync operation.
    pub async fn sync_once(&self) -> Result<SyncResult, SyncError> {
        let start = Instant::now();
        info!("Starting sync for league {}", self.config.league_id);

        let bootstrap = self.api.bootstrap().await?;
        let current_event = bootstrap.current_event();
        let finished = bootstrap.finished_events();
        let gameweeks = GameweekInfo::new(current_event, &finished);

        let members = self.fetch_members().await?;
        if members.is_empty() {
            return Err(SyncError::EmptyLeague(self.config.league_id));
        }

        let last_event = current_event.unwrap_or(self.config.season_length);
        let mut scores = Vec::new();
        let mut chips = Vec::new();
        for member in &members {
            scores.extend(self.fetch_scores(member).await?);
            chips.extend(self.fetch_chips(member, last_event).await?);
        }

        let written = !self.config.dry_run;
        if written {
            let storage = &self.config.storage;
            JsonlWriter::for_table(storage, TableKind::WeeklyScores).write_all(&scores)?;
            JsonlWriter::for_table(storage, TableKind::ChipUsage).write_all(&chips)?;
            JsonlWriter::for_table(storage, TableKind::GameweekInfo)
                .write_all(std::slice::from_ref(&gameweeks))?;
        } else {
            info!("Dry run: nothing written");
        }

        let result = SyncResult {
            managers: members.len(),
            score_rows: scores.len(),
            chip_rows: chips.len(),
            current_event,
            finished_events: finished.len(),
            written,
            duration: start.elapsed(),
        };
        info!(
            "Sync completed: {} managers, {} score rows, {} chip rows in {:?}",
            result.managers, result.score_rows, result.chip_rows, result.duration
        );
        Ok(result)
    }

    /// Every standings page until an empty one.
    async fn fetch_members(&self) -> Result<Vec<StandingEntry>, SyncError> {
        let mut members = Vec::new();
        let mut page = 1;
        loop {
            let standings = self.api.standings_page(self.config.league_id, page).await?;
            if standings.results.is_empty() {
                break;
            }
            members.extend(standings.results);
            if !standings.has_next {
                break;
            }
            page += 1;
        }
        Ok(members)
    }

    async fn fetch_scores(&self, member: &StandingEntry) -> Result<Vec<ScoreRow>, SyncError> {
        let history = self.api.entry_history(member.entry).await?;
        debug!(
            "Entry {}: {} gameweeks of history",
            member.entry,
            history.current.len()
        );
        Ok(history
            .current
            .into_iter()
            .map(|gw| ScoreRow {
                entry_id: member.entry,
                player_name: title_case(&member.player_name),
                team_name: member.entry_name.clone(),
                event: gw.event,
                points: gw.points,
                total_points: gw.total_points,
                extra: gw.extra,
            })
            .collect())
    }

    /// Probe gameweeks in order; the first one without picks ends the probe.
    async fn fetch_chips(
        &self,
        member: &StandingEntry,
        last_event: u32,
    ) -> Result<Vec<ChipRow>, SyncError> {
        let mut rows = Vec::new();
        for event in 1..=last_event {
            let Some(picks) = self.api.entry_picks(member.entry, event).await? else {
                break;
            };
            if let Some(chip) = picks.active_chip {
                rows.push(ChipRow {
                    entry_id: member.entry,
                    player_name: title_case(&member.player_name),
                    team_name: member.entry_name.clone(),
                    event,
                    chip,
                });
            }
        }
        Ok(rows)
    }
}
