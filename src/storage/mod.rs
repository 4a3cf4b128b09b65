//! Flat-file table storage.
//!
//! Every raw table is a JSON Lines file under `<data_dir>/tables/`.
//! Tables are replaced wholesale by ingestion and only read by the core.

mod jsonl;
mod table;

pub use jsonl::*;
pub use table::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while turning a raw table into typed records.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is absent from every row of the table.
    #[error("Table {table} is missing required column '{column}'")]
    Schema { table: TableKind, column: String },

    /// The table file does not exist yet.
    #[error("No {table} data available yet")]
    Missing { table: TableKind },

    /// The finished-gameweek list could not be parsed.
    #[error("Unreadable finished gameweek list: {0:?}")]
    MalformedEventList(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DataError {
    /// Whether this is the benign "nothing fetched yet" state.
    pub fn is_missing(&self) -> bool {
        matches!(self, DataError::Missing { .. })
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join("tables")
    }

    pub fn table_path(&self, table: TableKind) -> PathBuf {
        self.tables_dir().join(table.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
