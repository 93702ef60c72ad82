// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    game::{rank_players, Standings},
    models::{PlayerKey, WalletAddress},
    state::AppState,
};

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Number of entries (default 10, max 100).
    pub limit: Option<usize>,
    /// Connected wallet, flagged in the result.
    #[param(value_type = Option<String>)]
    pub address: Option<WalletAddress>,
}

#[utoipa::path(
    get,
    path = "/v1/leaderboard",
    params(LeaderboardQuery),
    tag = "Leaderboard",
    responses((status = 200, body = Standings))
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Standings>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let wallets: Vec<_> = state
        .players
        .scan()?
        .into_iter()
        .filter_map(|(key, record)| match key {
            PlayerKey::Wallet(address) => Some((address, record)),
            _ => None,
        })
        .collect();

    Ok(Json(rank_players(wallets, query.address.as_ref(), limit)))
}
