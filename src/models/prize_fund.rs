//! Prize fund reference table.

use serde::{Deserialize, Serialize};

use crate::storage::{Row, RowError, TableKind, TableRow};

/// Which competition a prize belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeCategory {
    /// Main classic league
    Standard,
    /// Head-to-head league
    H2h,
    Cup,
    Weekly,
}

impl PrizeCategory {
    /// Display order.
    pub const ALL: [PrizeCategory; 4] = [
        PrizeCategory::Standard,
        PrizeCategory::H2h,
        PrizeCategory::Cup,
        PrizeCategory::Weekly,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(PrizeCategory::Standard),
            "h2h" => Some(PrizeCategory::H2h),
            "cup" => Some(PrizeCategory::Cup),
            "weekly" => Some(PrizeCategory::Weekly),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PrizeCategory::Standard => "Main League",
            PrizeCategory::H2h => "Head to Head League",
            PrizeCategory::Cup => "Jager Cup",
            PrizeCategory::Weekly => "Weekly Winner",
        }
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st, 112th.
pub fn ordinal(n: u32) -> String {
    let suffix = if (10..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}

/// One prize in the fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeFundEntry {
    pub category: PrizeCategory,
    pub position: u32,
    pub amount: f64,
}

impl PrizeFundEntry {
    /// Label shown next to the amount. Weekly prizes have no position.
    pub fn position_label(&self) -> Option<String> {
        match self.category {
            PrizeCategory::Weekly => None,
            PrizeCategory::Cup if self.position == 1 => Some("Winner".to_string()),
            _ => Some(ordinal(self.position)),
        }
    }
}

impl TableRow for PrizeFundEntry {
    const TABLE: TableKind = TableKind::PrizeFund;
    const REQUIRED_COLUMNS: &'static [&'static str] = &["category", "position", "amount"];

    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
        let code = row.string("category")?;
        let category = PrizeCategory::from_code(&code).ok_or_else(|| RowError::InvalidField {
            column: "category".to_string(),
            reason: format!("unknown category '{code}'"),
        })?;
        let amount = row
            .opt_number("amount")?
            .ok_or_else(|| RowError::MissingField("amount".to_string()))?;

        Ok(Some(Self {
            category,
            position: row.event("position")?,
            amount,
        }))
    }
}
