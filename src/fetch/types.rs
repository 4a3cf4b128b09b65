//! Response shapes of the fantasy API.
//!
//! Only the fields the sync needs are typed; anything else is ignored, except
//! for gameweek history rows which keep their extra fields for the score table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `/leagues-classic/{id}/standings/`
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsResponse {
    pub standings: Standings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Standings {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub results: Vec<StandingEntry>,
}

/// A league member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandingEntry {
    /// Entry (team) id
    pub entry: u64,
    pub player_name: String,
    /// Team name
    #[serde(default)]
    pub entry_name: String,
}

/// `/entry/{id}/history/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryHistory {
    #[serde(default)]
    pub current: Vec<GameweekHistory>,
}

/// One gameweek of an entry's season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekHistory {
    pub event: u32,
    pub points: i64,
    pub total_points: i64,
    /// Rank, bank, transfers and whatever else the API reports
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/entry/{id}/event/{gw}/picks/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPicks {
    #[serde(default)]
    pub active_chip: Option<String>,
}

/// `/bootstrap-static/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapStatic {
    #[serde(default)]
    pub events: Vec<BootstrapEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BootstrapEvent {
    pub id: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub finished: bool,
}

impl BootstrapStatic {
    pub fn current_event(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_current).map(|e| e.id)
    }

    pub fn finished_events(&self) -> Vec<u32> {
        self.events.iter().filter(|e| e.finished).map(|e| e.id).collect()
    }
}
