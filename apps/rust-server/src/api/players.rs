// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    game::PlayerRecord,
    models::{PlayerKey, PlayerView, WalletAddress},
    state::AppState,
    storage::LedgerEvent,
};

const DEFAULT_EVENT_LIMIT: usize = 20;
const MAX_EVENT_LIMIT: usize = 100;

/// Parse a `{player}` path segment.
///
/// Accepts a storage key (`wallet:0x…`, `fid:42`, `guest`) or a bare
/// wallet address.
pub fn parse_player(raw: &str) -> Result<PlayerKey, ApiError> {
    let raw = raw.trim();
    if raw.starts_with("0x") || raw.starts_with("0X") {
        return WalletAddress::parse(raw)
            .map(PlayerKey::Wallet)
            .map_err(ApiError::bad_request);
    }
    raw.parse().map_err(ApiError::bad_request)
}

/// Balance-changing operations need a connected player. The guest
/// record is read-only.
pub fn require_connected(key: &PlayerKey) -> Result<(), ApiError> {
    match key {
        PlayerKey::Guest => Err(ApiError::bad_request("Connect a wallet first.")),
        _ => Ok(()),
    }
}

/// Load a player or fail with 404. The guest record always reads as present.
pub fn load_player(state: &AppState, key: &PlayerKey) -> Result<PlayerRecord, ApiError> {
    match state.players.get(key)? {
        Some(record) => Ok(record),
        None if *key == PlayerKey::Guest => Ok(PlayerRecord::new_for(key)),
        None => Err(ApiError::not_found(format!(
            "Player {key} not found. Connect a wallet first."
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/v1/players/{player}",
    params(("player" = String, Path, description = "Player key or wallet address")),
    tag = "Players",
    responses(
        (status = 200, body = PlayerView),
        (status = 400, description = "Malformed player key"),
        (status = 404, description = "Player not found")
    )
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<PlayerView>, ApiError> {
    let key = parse_player(&player)?;
    let record = load_player(&state, &key)?;
    Ok(Json(PlayerView::new(&key, record)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Maximum number of events (default 20, max 100).
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/v1/players/{player}/events",
    params(
        ("player" = String, Path, description = "Player key or wallet address"),
        EventsQuery
    ),
    tag = "Players",
    responses(
        (status = 200, body = [LedgerEvent]),
        (status = 404, description = "Player not found")
    )
)]
pub async fn list_player_events(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<LedgerEvent>>, ApiError> {
    let key = parse_player(&player)?;
    load_player(&state, &key)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);
    Ok(Json(state.players.events_for(&key, limit)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    const ADDR: &str = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12";

    #[test]
    fn parse_player_accepts_keys_and_addresses() {
        let wallet = parse_player(&ADDR.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(wallet.to_string(), format!("wallet:{ADDR}"));
        assert_eq!(parse_player("fid:9").unwrap(), PlayerKey::Fid(9));
        assert_eq!(parse_player("guest").unwrap(), PlayerKey::Guest);

        let err = parse_player("someone").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_player_unknown_wallet_is_404() {
        let state = AppState::default();
        let err = get_player(State(state), Path(ADDR.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn guest_always_exists() {
        let state = AppState::default();
        let Json(view) = get_player(State(state), Path("guest".to_string()))
            .await
            .unwrap();
        assert_eq!(view.player, "guest");
        assert_eq!(view.balance, 0);
        assert_eq!(view.referral_code, "");
    }

    #[tokio::test]
    async fn events_are_listed_for_known_players() {
        let state = AppState::default();
        let key = parse_player(ADDR).unwrap();
        state.players.get_or_create(&key, Utc::now()).unwrap();

        let Json(view) = get_player(State(state.clone()), Path(ADDR.to_string()))
            .await
            .unwrap();
        assert_eq!(view.referral_code, "742B12");

        let Json(events) = list_player_events(
            State(state),
            Path(format!("wallet:{ADDR}")),
            Query(EventsQuery { limit: Some(500) }),
        )
        .await
        .unwrap();
        assert_eq!(events.len(), 1);
    }
}
