//! Head-to-head cup fixtures.

use serde::{Deserialize, Serialize};

use super::title_case;
use crate::storage::{Row, RowError, TableKind, TableRow};

/// One side of a cup fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    /// Manager name; some feeds leave it blank
    pub manager_name: Option<String>,
    pub team_name: Option<String>,
    /// `None` until the gameweek has been scored
    pub points: Option<f64>,
}

impl Entrant {
    pub fn new(manager_name: &str, team_name: &str, points: Option<f64>) -> Self {
        Self {
            manager_name: Some(title_case(manager_name)).filter(|n| !n.is_empty()),
            team_name: Some(team_name.trim().to_string()).filter(|n| !n.is_empty()),
            points,
        }
    }

    /// Best available name: the manager, else the team.
    pub fn display_name(&self) -> &str {
        self.manager_name
            .as_deref()
            .or(self.team_name.as_deref())
            .unwrap_or("")
    }

    /// Whether `name` refers to this entrant, by manager or team.
    fn is_named(&self, name: &str) -> bool {
        [&self.manager_name, &self.team_name]
            .into_iter()
            .flatten()
            .any(|n| n.eq_ignore_ascii_case(name.trim()))
    }

    fn is_blank(&self) -> bool {
        self.manager_name.is_none() && self.team_name.is_none()
    }

    fn from_row(row: Row<'_>, side: u8) -> Result<Self, RowError> {
        Ok(Self {
            manager_name: row
                .opt_string(&format!("entry_{side}_player_name"))?
                .map(|n| title_case(&n)),
            team_name: row.opt_string(&format!("entry_{side}_team_name"))?,
            points: row.opt_number(&format!("entry_{side}_points"))?,
        })
    }
}

/// One cup fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupMatch {
    pub event: u32,
    /// Round label ("Round of 32", "Final"); not a sort key
    pub stage: String,
    pub entrant_a: Entrant,
    /// `None` for a bye
    pub entrant_b: Option<Entrant>,
    /// Winner as reported by the feed
    pub winner: Option<String>,
    pub is_bye: bool,
}

impl CupMatch {
    pub fn fixture(event: u32, stage: &str, a: Entrant, b: Entrant) -> Self {
        Self {
            event,
            stage: stage.to_string(),
            entrant_a: a,
            entrant_b: Some(b),
            winner: None,
            is_bye: false,
        }
    }

    pub fn bye(event: u32, stage: &str, a: Entrant) -> Self {
        Self {
            event,
            stage: stage.to_string(),
            winner: a.manager_name.clone(),
            entrant_a: a,
            entrant_b: None,
            is_bye: true,
        }
    }
}

impl TableRow for CupMatch {
    const TABLE: TableKind = TableKind::CupMatches;
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "event",
        "stage",
        "entry_1_player_name",
        "entry_1_team_name",
        "entry_1_points",
        "entry_2_player_name",
        "entry_2_team_name",
        "entry_2_points",
        "winner",
        "is_bye",
    ];

    fn from_row(row: Row<'_>) -> Result<Option<Self>, RowError> {
        let is_bye = row.flag("is_bye")?;
        let entrant_a = Entrant::from_row(row, 1)?;
        let entrant_b = Entrant::from_row(row, 2)?;

        if entrant_a.is_blank() {
            return Err(RowError::Inconsistent("fixture has no first entrant".to_string()));
        }

        let entrant_b = match (is_bye, entrant_b.is_blank()) {
            (true, true) => None,
            (true, false) => {
                return Err(RowError::Inconsistent(
                    "bye lists a second entrant".to_string(),
                ))
            }
            (false, true) => {
                return Err(RowError::Inconsistent(
                    "fixture has no second entrant".to_string(),
                ))
            }
            (false, false) => Some(entrant_b),
        };

        let winner = row.opt_string("winner")?.map(|w| title_case(&w));
        if let (true, Some(w)) = (is_bye, &winner) {
            if !entrant_a.is_named(w) {
                return Err(RowError::Inconsistent(format!(
                    "bye winner '{w}' is not the first entrant"
                )));
            }
        }

        Ok(Some(Self {
            event: row.event("event")?,
            stage: row.string("stage")?,
            entrant_a,
            entrant_b,
            winner,
            is_bye,
        }))
    }
}
