use std::sync::Arc;

use crate::calculate::LeagueSettings;
use crate::snapshot::SnapshotCache;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
    pub settings: Arc<LeagueSettings>,
}

impl AppState {
    pub fn new(cache: SnapshotCache, settings: LeagueSettings) -> Self {
        Self {
            cache: Arc::new(cache),
            settings: Arc::new(settings),
        }
    }
}
