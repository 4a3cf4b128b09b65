//! Typed table loading with schema and row validation.
//!
//! A table whose rows all lack a required column is a schema error and
//! yields nothing. Individual rows that fail validation are dropped and
//! counted; the rest of the table is still usable.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::{DataError, JsonlReader, StorageConfig, TableKind};

/// Why a single row was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing value for '{0}'")]
    MissingField(String),

    #[error("invalid value for '{column}': {reason}")]
    InvalidField { column: String, reason: String },

    #[error("{0}")]
    Inconsistent(String),
}

impl RowError {
    fn invalid(column: &str, reason: impl Into<String>) -> Self {
        RowError::InvalidField {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read-only view over one raw row.
///
/// Accessors treat JSON `null` like an absent field and accept numbers
/// written as strings, since upstream exports are not consistent about it.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a>(&'a Map<String, Value>);

impl<'a> Row<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self(fields)
    }

    fn value(&self, column: &str) -> Option<&'a Value> {
        self.0.get(column).filter(|v| !v.is_null())
    }

    /// The raw JSON value, `None` when absent or null.
    pub fn raw(&self, column: &str) -> Option<&'a Value> {
        self.value(column)
    }

    /// Required text field. Numbers are rendered as text.
    pub fn string(&self, column: &str) -> Result<String, RowError> {
        self.opt_string(column)?
            .ok_or_else(|| RowError::MissingField(column.to_string()))
    }

    /// Optional text field; blank text reads as `None`.
    pub fn opt_string(&self, column: &str) -> Result<Option<String>, RowError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let s = s.trim();
                Ok((!s.is_empty()).then(|| s.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(RowError::invalid(column, format!("expected text, got {other}"))),
        }
    }

    /// Optional numeric field.
    pub fn opt_number(&self, column: &str) -> Result<Option<f64>, RowError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| RowError::invalid(column, "not representable as a number")),
            Some(Value::String(s)) if s.trim().is_empty() || s.trim() == "NaN" => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| RowError::invalid(column, format!("'{s}' is not a number"))),
            Some(other) => Err(RowError::invalid(column, format!("expected a number, got {other}"))),
        }
    }

    /// Required whole-number field. Floats are accepted only when integral.
    pub fn int(&self, column: &str) -> Result<i64, RowError> {
        if let Some(i) = self.value(column).and_then(Value::as_i64) {
            return Ok(i);
        }
        let n = self
            .opt_number(column)?
            .ok_or_else(|| RowError::MissingField(column.to_string()))?;
        if n.fract() != 0.0 || !n.is_finite() {
            return Err(RowError::invalid(column, format!("{n} is not a whole number")));
        }
        Ok(n as i64)
    }

    /// Required gameweek-style field: a whole number of at least 1.
    pub fn event(&self, column: &str) -> Result<u32, RowError> {
        let n = self.int(column)?;
        u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| RowError::invalid(column, format!("{n} is not a gameweek")))
    }

    /// Required boolean field. Accepts `true`/`false`, `1`/`0` and the
    /// capitalised `True`/`False` spreadsheet spelling.
    pub fn flag(&self, column: &str) -> Result<bool, RowError> {
        match self.value(column) {
            None => Err(RowError::MissingField(column.to_string())),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(RowError::invalid(column, format!("{n} is not a flag"))),
            },
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(RowError::invalid(column, format!("'{s}' is not a flag"))),
            },
            Some(other) => Err(RowError::invalid(column, format!("expected a flag, got {other}"))),
        }
    }
}

/// A record type that can be built from a raw table row.
pub trait TableRow: Sized {
    const TABLE: TableKind;
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Build the record. `Ok(None)` means the row is valid but carries
    /// nothing the core uses, and is skipped without being counted as bad.
    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError>;

    /// Identity used to drop duplicate rows; later duplicates lose.
    fn dedup_key(&self) -> Option<String> {
        None
    }
}

/// Typed rows of one table plus bookkeeping about what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    /// Rows that failed to parse or validate
    pub rejected: usize,
    /// Rows intentionally skipped
    pub filtered: usize,
}

impl<T> LoadedTable<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            rejected: 0,
            filtered: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load and validate one raw table.
pub fn load_table<T: TableRow>(config: &StorageConfig) -> Result<LoadedTable<T>, DataError> {
    let reader = JsonlReader::<Map<String, Value>>::for_table(config, T::TABLE);
    if !reader.exists() {
        return Err(DataError::Missing { table: T::TABLE });
    }

    let (raw, unparseable) = reader.read_counting_rejects()?;
    from_raw_rows(&raw, unparseable)
}

/// Validate already-parsed raw rows.
pub fn from_raw_rows<T: TableRow>(
    raw: &[Map<String, Value>],
    unparseable: usize,
) -> Result<LoadedTable<T>, DataError> {
    if !raw.is_empty() {
        if let Some(column) = T::REQUIRED_COLUMNS
            .iter()
            .find(|c| !raw.iter().any(|r| r.contains_key(**c)))
        {
            return Err(DataError::Schema {
                table: T::TABLE,
                column: column.to_string(),
            });
        }
    }

    let mut table = LoadedTable::new(Vec::with_capacity(raw.len()));
    table.rejected = unparseable;
    let mut seen = HashSet::new();

    for (idx, fields) in raw.iter().enumerate() {
        match T::from_row(Row::new(fields)) {
            Ok(Some(record)) => {
                if let Some(key) = record.dedup_key() {
                    if !seen.insert(key.clone()) {
                        warn!("{}: dropping duplicate row {} ({})", T::TABLE, idx + 1, key);
                        table.rejected += 1;
                        continue;
                    }
                }
                table.rows.push(record);
            }
            Ok(None) => table.filtered += 1,
            Err(e) => {
                warn!("{}: rejecting row {}: {}", T::TABLE, idx + 1, e);
                table.rejected += 1;
            }
        }
    }

    info!(
        "Loaded {} {} rows ({} rejected, {} filtered)",
        table.rows.len(),
        T::TABLE,
        table.rejected,
        table.filtered
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Pick {
        name: String,
        event: u32,
    }

    impl TableRow for Pick {
        const TABLE: TableKind = TableKind::ChipUsage;
        const REQUIRED_COLUMNS: &'static [&'static str] = &["name", "event"];

        fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
            let name = row.string("name")?;
            if name == "skip" {
                return Ok(None);
            }
            Ok(Some(Self {
                name,
                event: row.event("event")?,
            }))
        }

        fn dedup_key(&self) -> Option<String> {
            Some(format!("{}|{}", self.name, self.event))
        }
    }

    fn rows(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_schema_error_when_column_absent_everywhere() {
        let raw = rows(vec![json!({"name": "A"}), json!({"name": "B"})]);
        let err = from_raw_rows::<Pick>(&raw, 0).unwrap_err();

        assert!(matches!(
            err,
            DataError::Schema { column, .. } if column == "event"
        ));
    }

    #[test]
    fn test_bad_rows_are_dropped_not_fatal() {
        let raw = rows(vec![
            json!({"name": "A", "event": 1}),
            json!({"name": "B"}),
            json!({"name": "C", "event": "x"}),
            json!({"name": "D", "event": "3"}),
            json!({"name": "skip", "event": 1}),
        ]);
        let table = from_raw_rows::<Pick>(&raw, 2).unwrap();

        assert_eq!(
            table.rows,
            vec![
                Pick { name: "A".into(), event: 1 },
                Pick { name: "D".into(), event: 3 },
            ]
        );
        assert_eq!(table.rejected, 4);
        assert_eq!(table.filtered, 1);
    }

    #[test]
    fn test_undecodable_line_is_rejected_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(tmp.path().to_path_buf());
        std::fs::create_dir_all(config.tables_dir()).unwrap();

        let mut bytes = b"{\"name\": \"A\", \"event\": 1}\n".to_vec();
        bytes.extend_from_slice(b"{\"name\": \"\xff\xfe\", \"event\": 2}\n");
        std::fs::write(config.table_path(TableKind::ChipUsage), bytes).unwrap();

        let table = load_table::<Pick>(&config).unwrap();
        assert_eq!(table.rows, vec![Pick { name: "A".into(), event: 1 }]);
        assert_eq!(table.rejected, 1);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let raw = rows(vec![
            json!({"name": "A", "event": 1}),
            json!({"name": "A", "event": 1}),
        ]);
        let table = from_raw_rows::<Pick>(&raw, 0).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rejected, 1);
    }

    #[test]
    fn test_empty_table_is_not_a_schema_error() {
        let table = from_raw_rows::<Pick>(&[], 0).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(tmp.path().to_path_buf());

        let err = load_table::<Pick>(&config).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_row_accessors() {
        let raw = json!({
            "text": "  Alice ",
            "blank": "",
            "num_text": "42",
            "float": 80.0,
            "frac": 80.5,
            "nan": "NaN",
            "null": null,
            "bool_str": "True",
            "bool_num": 0,
        });
        let row = Row::new(raw.as_object().unwrap());

        assert_eq!(row.string("text").unwrap(), "Alice");
        assert_eq!(row.opt_string("blank").unwrap(), None);
        assert_eq!(row.int("num_text").unwrap(), 42);
        assert_eq!(row.int("float").unwrap(), 80);
        assert!(row.int("frac").is_err());
        assert_eq!(row.opt_number("nan").unwrap(), None);
        assert_eq!(row.opt_number("null").unwrap(), None);
        assert_eq!(row.string("null"), Err(RowError::MissingField("null".into())));
        assert!(row.flag("bool_str").unwrap());
        assert!(!row.flag("bool_num").unwrap());
        assert!(row.event("bool_num").is_err());
    }
}
