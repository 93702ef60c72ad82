// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::players::{load_player, parse_player, require_connected};
use crate::{
    error::ApiError,
    game::{check_eligibility, ClaimEligibility, DAILY_CLAIM_REWARD},
    models::PlayerView,
    state::AppState,
    storage::OnMissing,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub player: PlayerView,
    /// Tokens granted by this claim.
    pub reward: u64,
    /// Eligibility after the claim (next window).
    pub eligibility: ClaimEligibility,
}

#[utoipa::path(
    get,
    path = "/v1/players/{player}/claim",
    params(("player" = String, Path, description = "Player key or wallet address")),
    tag = "Claims",
    responses(
        (status = 200, body = ClaimEligibility),
        (status = 404, description = "Player not found")
    )
)]
pub async fn get_claim_status(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<ClaimEligibility>, ApiError> {
    let key = parse_player(&player)?;
    let record = load_player(&state, &key)?;
    Ok(Json(check_eligibility(record.last_claim, Utc::now())))
}

#[utoipa::path(
    post,
    path = "/v1/players/{player}/claim",
    params(("player" = String, Path, description = "Player key or wallet address")),
    tag = "Claims",
    responses(
        (status = 200, body = ClaimResponse),
        (status = 400, description = "Guest players cannot claim"),
        (status = 404, description = "Player not found"),
        (status = 429, description = "Already claimed within the last 24 hours")
    )
)]
pub async fn claim_daily(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let key = parse_player(&player)?;
    require_connected(&key)?;
    let now = Utc::now();
    let record = state.players.claim(&key, now, OnMissing::Reject)?;

    Ok(Json(ClaimResponse {
        eligibility: check_eligibility(record.last_claim, now),
        player: PlayerView::new(&key, record),
        reward: DAILY_CLAIM_REWARD,
    }))
}
