use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{
    chip_summary_view, chip_timeline_view, cup_view, prize_fund_view, prize_ledger_view,
    weekly_winner_view, View,
};
use crate::models::{
    ChipSummary, ChipTimelinePoint, CupBracket, PrizeFundSection, PrizeTotal, WeeklyWinnerRow,
};

#[derive(Debug, Deserialize)]
pub struct UserParams {
    /// Manager to highlight
    pub user: Option<String>,
}

impl UserParams {
    fn selected(&self) -> Result<Option<&str>, ApiError> {
        match self.user.as_deref().map(str::trim) {
            Some("") => Err(ApiError::BadRequest("user must not be blank".to_string())),
            other => Ok(other),
        }
    }
}

pub async fn managers(State(state): State<AppState>) -> Json<View<Vec<String>>> {
    let managers = state.cache.get().managers();
    if managers.is_empty() {
        return Json(View::no_data("No managers found yet."));
    }
    Json(View::ready(managers))
}

pub async fn weekly_winners(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<View<Vec<WeeklyWinnerRow>>>, ApiError> {
    let selected = params.selected()?;
    let snapshot = state.cache.get();
    Ok(Json(weekly_winner_view(&snapshot, &state.settings, selected)))
}

pub async fn prizes(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<View<Vec<PrizeTotal>>>, ApiError> {
    let selected = params.selected()?;
    let snapshot = state.cache.get();
    Ok(Json(prize_ledger_view(&snapshot, &state.settings, selected)))
}

pub async fn chips(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<View<Vec<ChipSummary>>>, ApiError> {
    let selected = params.selected()?;
    let snapshot = state.cache.get();
    Ok(Json(chip_summary_view(&snapshot, &state.settings, selected)))
}

pub async fn chip_timeline(State(state): State<AppState>) -> Json<View<Vec<ChipTimelinePoint>>> {
    Json(chip_timeline_view(&state.cache.get()))
}

pub async fn cup(State(state): State<AppState>) -> Json<View<CupBracket>> {
    Json(cup_view(&state.cache.get()))
}

pub async fn prize_fund(State(state): State<AppState>) -> Json<View<Vec<PrizeFundSection>>> {
    Json(prize_fund_view(&state.cache.get()))
}
