//! Process-wide snapshot of the raw tables.
//!
//! A [`Snapshot`] is loaded in one pass and never mutated. [`SnapshotCache`]
//! hands out the same `Arc<Snapshot>` until it is reloaded explicitly or its
//! TTL runs out.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{ChipEvent, CupMatch, GameweekInfo, PrizeFundEntry, ScoreRecord};
use crate::storage::{load_table, DataError, LoadedTable, StorageConfig, TableKind};

/// Outcome of loading one table.
pub type TableResult<T> = Result<LoadedTable<T>, DataError>;

/// All raw tables as of one load.
#[derive(Debug)]
pub struct Snapshot {
    pub scores: TableResult<ScoreRecord>,
    pub chips: TableResult<ChipEvent>,
    pub cup: TableResult<CupMatch>,
    pub gameweeks: TableResult<GameweekInfo>,
    pub prize_fund: TableResult<PrizeFundEntry>,
    pub loaded_at: DateTime<Utc>,
}

/// Per-table load status, for the reload endpoint and the report command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStatus {
    pub table: String,
    pub status: &'static str,
    pub rows: usize,
    pub rejected: usize,
    pub message: Option<String>,
}

impl Snapshot {
    /// Read every table from disk.
    pub fn load(storage: &StorageConfig) -> Self {
        let snapshot = Self {
            scores: load_table(storage),
            chips: load_table(storage),
            cup: load_table(storage),
            gameweeks: load_table(storage),
            prize_fund: load_table(storage),
            loaded_at: Utc::now(),
        };

        for status in snapshot.table_statuses() {
            match status.status {
                "error" => warn!(
                    "{}: {}",
                    status.table,
                    status.message.as_deref().unwrap_or("failed to load")
                ),
                _ => info!("{}: {} ({} rows)", status.table, status.status, status.rows),
            }
        }
        snapshot
    }

    /// Build a snapshot from in-memory rows.
    pub fn from_tables(
        scores: TableResult<ScoreRecord>,
        chips: TableResult<ChipEvent>,
        cup: TableResult<CupMatch>,
        gameweeks: TableResult<GameweekInfo>,
        prize_fund: TableResult<PrizeFundEntry>,
    ) -> Self {
        Self {
            scores,
            chips,
            cup,
            gameweeks,
            prize_fund,
            loaded_at: Utc::now(),
        }
    }

    /// A snapshot where every table is absent.
    pub fn empty() -> Self {
        Self::from_tables(
            Err(DataError::Missing {
                table: TableKind::WeeklyScores,
            }),
            Err(DataError::Missing {
                table: TableKind::ChipUsage,
            }),
            Err(DataError::Missing {
                table: TableKind::CupMatches,
            }),
            Err(DataError::Missing {
                table: TableKind::GameweekInfo,
            }),
            Err(DataError::Missing {
                table: TableKind::PrizeFund,
            }),
        )
    }

    /// Finished gameweeks, if the season-progress table says anything.
    ///
    /// `None` means no filter applies. `Some(Err(_))` means the table exists
    /// but has no usable list.
    pub fn finished_events(&self) -> Option<Result<BTreeSet<u32>, DataError>> {
        match &self.gameweeks {
            Err(DataError::Missing { .. }) => None,
            Err(e) => Some(Err(DataError::MalformedEventList(e.to_string()))),
            Ok(table) => Some(match table.rows.first() {
                Some(info) => info.finished(),
                None => Err(DataError::MalformedEventList(format!(
                    "no usable {} row ({} rejected)",
                    TableKind::GameweekInfo,
                    table.rejected
                ))),
            }),
        }
    }

    /// Sorted unique manager names from the score table.
    pub fn managers(&self) -> Vec<String> {
        let Ok(scores) = &self.scores else {
            return Vec::new();
        };
        scores
            .rows
            .iter()
            .map(|r| r.manager_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn table_statuses(&self) -> Vec<TableStatus> {
        vec![
            table_status(TableKind::WeeklyScores, &self.scores),
            table_status(TableKind::ChipUsage, &self.chips),
            table_status(TableKind::CupMatches, &self.cup),
            table_status(TableKind::GameweekInfo, &self.gameweeks),
            table_status(TableKind::PrizeFund, &self.prize_fund),
        ]
    }
}

fn table_status<T>(table: TableKind, result: &TableResult<T>) -> TableStatus {
    match result {
        Ok(t) => TableStatus {
            table: table.to_string(),
            status: if t.rejected > 0 { "degraded" } else { "ready" },
            rows: t.rows.len(),
            rejected: t.rejected,
            message: None,
        },
        Err(e) => TableStatus {
            table: table.to_string(),
            status: if e.is_missing() { "missing" } else { "error" },
            rows: 0,
            rejected: 0,
            message: Some(e.to_string()),
        },
    }
}

struct Cached {
    snapshot: Arc<Snapshot>,
    loaded: Instant,
}

/// Load-once cache over the table directory.
pub struct SnapshotCache {
    storage: StorageConfig,
    ttl: Option<Duration>,
    current: RwLock<Option<Cached>>,
}

impl SnapshotCache {
    /// `ttl: None` keeps a snapshot until [`SnapshotCache::reload`].
    pub fn new(storage: StorageConfig, ttl: Option<Duration>) -> Self {
        Self {
            storage,
            ttl,
            current: RwLock::new(None),
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// The cached snapshot, loading it first if absent or expired.
    pub fn get(&self) -> Arc<Snapshot> {
        {
            let current = self.current.read();
            if let Some(cached) = current.as_ref() {
                if !self.is_expired(cached) {
                    return Arc::clone(&cached.snapshot);
                }
            }
        }
        self.reload()
    }

    /// Load a fresh snapshot and replace the cached one.
    pub fn reload(&self) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::load(&self.storage));
        *self.current.write() = Some(Cached {
            snapshot: Arc::clone(&snapshot),
            loaded: Instant::now(),
        });
        info!("Snapshot reloaded from {:?}", self.storage.tables_dir());
        snapshot
    }

    /// Drop the cached snapshot; the next `get` reloads.
    pub fn invalidate(&self) {
        *self.current.write() = None;
    }

    fn is_expired(&self, cached: &Cached) -> bool {
        self.ttl
            .map(|ttl| cached.loaded.elapsed() >= ttl)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonlWriter;
    use serde_json::json;

    fn write_scores(storage: &StorageConfig, rows: &[serde_json::Value]) {
        JsonlWriter::for_table(storage, TableKind::WeeklyScores)
            .write_all(rows)
            .unwrap();
    }

    fn score(name: &str, event: u32, points: i64) -> serde_json::Value {
        json!({"player_name": name, "event": event, "points": points, "total_points": points})
    }

    #[test]
    fn test_empty_directory_loads_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&StorageConfig::new(tmp.path().to_path_buf()));

        assert!(snapshot.table_statuses().iter().all(|s| s.status == "missing"));
        assert!(snapshot.finished_events().is_none());
        assert!(snapshot.managers().is_empty());
    }

    #[test]
    fn test_cache_reuses_until_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        write_scores(&storage, &[score("ann", 1, 50)]);

        let cache = SnapshotCache::new(storage.clone(), None);
        let first = cache.get();
        assert_eq!(first.managers(), vec!["Ann".to_string()]);

        write_scores(&storage, &[score("ann", 1, 50), score("bob", 1, 60)]);
        let second = cache.get();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.managers().len(), 1);

        let reloaded = cache.reload();
        assert_eq!(reloaded.managers(), vec!["Ann".to_string(), "Bob".to_string()]);
        assert!(Arc::ptr_eq(&reloaded, &cache.get()));
    }

    #[test]
    fn test_cache_expires_after_ttl() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());

        let cache = SnapshotCache::new(storage, Some(Duration::ZERO));
        let first = cache.get();
        let second = cache.get();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(StorageConfig::new(tmp.path().to_path_buf()), None);

        let first = cache.get();
        cache.invalidate();
        assert!(!Arc::ptr_eq(&first, &cache.get()));
    }

    #[test]
    fn test_finished_events_from_table() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        JsonlWriter::for_table(&storage, TableKind::GameweekInfo)
            .write_all(&[json!({"current_event": 4, "finished_events": "1,2,3"})])
            .unwrap();

        let snapshot = Snapshot::load(&storage);
        let finished = snapshot.finished_events().unwrap().unwrap();
        assert_eq!(finished, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_gameweek_table_without_usable_row() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        let writer = JsonlWriter::for_table(&storage, TableKind::GameweekInfo);

        writer
            .write_all(&[json!({"current_event": 2, "finished_events": {"gw": 1}})])
            .unwrap();
        assert!(matches!(
            Snapshot::load(&storage).finished_events(),
            Some(Err(DataError::MalformedEventList(_)))
        ));

        writer.write_all(&[]).unwrap();
        assert!(matches!(
            Snapshot::load(&storage).finished_events(),
            Some(Err(DataError::MalformedEventList(_)))
        ));
    }

    #[test]
    fn test_schema_error_reported_per_table() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        write_scores(&storage, &[json!({"player_name": "Ann", "event": 1})]);

        let snapshot = Snapshot::load(&storage);
        assert!(matches!(snapshot.scores, Err(DataError::Schema { .. })));

        let statuses = snapshot.table_statuses();
        assert_eq!(statuses[0].status, "error");
        assert_eq!(statuses[1].status, "missing");
    }
}
