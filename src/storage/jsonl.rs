//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one table row.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// The raw tables making up a league snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    WeeklyScores,
    ChipUsage,
    CupMatches,
    GameweekInfo,
    PrizeFund,
}

impl TableKind {
    /// Table name as used in file names and messages.
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::WeeklyScores => "weekly_scores",
            TableKind::ChipUsage => "chip_usage",
            TableKind::CupMatches => "jager_cup_matches",
            TableKind::GameweekInfo => "gameweek_info",
            TableKind::PrizeFund => "prize_fund",
        }
    }

    /// Get the filename for this table.
    pub fn filename(&self) -> String {
        format!("{}.jsonl", self.name())
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a raw table.
    pub fn for_table(config: &StorageConfig, table: TableKind) -> Self {
        Self::new(config.table_path(table))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write rows, replacing the entire file.
    ///
    /// Rows go to a sibling temp file which is renamed over the target, so
    /// readers see either the old table or the complete new one.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, &self.path)?;
        info!("Wrote {} rows to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a raw table.
    pub fn for_table(config: &StorageConfig, table: TableKind) -> Self {
        Self::new(config.table_path(table))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all rows, also returning how many lines failed to parse.
    ///
    /// A missing file reads as empty. Lines that are not UTF-8 or not JSON
    /// are skipped and counted.
    pub fn read_counting_rejects(&self) -> Result<(Vec<T>, usize), StorageError> {
        if !self.path.exists() {
            return Ok((Vec::new(), 0));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();
        let mut rejected = 0;

        for (idx, line) in reader.split(b'\n').enumerate() {
            let line = line?;

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    rejected += 1;
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok((rows, rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRow {
        player_name: String,
        event: u32,
    }

    fn row(name: &str, event: u32) -> TestRow {
        TestRow {
            player_name: name.to_string(),
            event,
        }
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jsonl");
        let rows = vec![row("Alice", 1), row("Bob", 2)];

        let writer: JsonlWriter<TestRow> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&rows).unwrap(), 2);

        let reader: JsonlReader<TestRow> = JsonlReader::new(path);
        assert_eq!(reader.read_counting_rejects().unwrap(), (rows, 0));
    }

    #[test]
    fn test_write_all_replaces_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let writer: JsonlWriter<TestRow> = JsonlWriter::for_table(&config, TableKind::WeeklyScores);
        writer.write_all(&[row("Alice", 1), row("Bob", 1)]).unwrap();
        writer.write_all(&[row("Carol", 2)]).unwrap();

        let reader: JsonlReader<TestRow> = JsonlReader::for_table(&config, TableKind::WeeklyScores);
        assert_eq!(reader.read_counting_rejects().unwrap(), (vec![row("Carol", 2)], 0));

        let leftovers: Vec<_> = fs::read_dir(config.tables_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_jsonl_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<TestRow> = JsonlReader::new(temp_dir.path().join("nope.jsonl"));

        assert!(!reader.exists());
        assert_eq!(reader.read_counting_rejects().unwrap(), (Vec::new(), 0));
    }

    #[test]
    fn test_jsonl_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        fs::write(
            &path,
            "{\"player_name\":\"Alice\",\"event\":1}\nnot json\n\n{\"player_name\":\"Bob\",\"event\":2}\n",
        )
        .unwrap();

        let reader: JsonlReader<TestRow> = JsonlReader::new(path);
        let (rows, rejected) = reader.read_counting_rejects().unwrap();

        assert_eq!(rows, vec![row("Alice", 1), row("Bob", 2)]);
        assert_eq!(rejected, 1);
    }

    #[test]
    fn test_jsonl_skips_invalid_utf8_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bytes.jsonl");
        let mut bytes = b"{\"player_name\":\"Alice\",\"event\":1}\n".to_vec();
        bytes.extend_from_slice(b"{\"player_name\":\"B\xff\xfeb\",\"event\":2}\r\n");
        bytes.extend_from_slice(b"{\"player_name\":\"Carol\",\"event\":3}");
        fs::write(&path, bytes).unwrap();

        let reader: JsonlReader<TestRow> = JsonlReader::new(path);
        let (rows, rejected) = reader.read_counting_rejects().unwrap();

        assert_eq!(rows, vec![row("Alice", 1), row("Carol", 3)]);
        assert_eq!(rejected, 1);
    }

    #[test]
    fn test_table_filenames() {
        assert_eq!(TableKind::WeeklyScores.filename(), "weekly_scores.jsonl");
        assert_eq!(TableKind::ChipUsage.filename(), "chip_usage.jsonl");
        assert_eq!(TableKind::CupMatches.filename(), "jager_cup_matches.jsonl");
        assert_eq!(TableKind::GameweekInfo.filename(), "gameweek_info.jsonl");
        assert_eq!(TableKind::PrizeFund.filename(), "prize_fund.jsonl");
    }
}
