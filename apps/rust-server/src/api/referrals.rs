// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::{header::HOST, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::players::{load_player, parse_player, require_connected};
use crate::{
    error::ApiError,
    frame::{referral_url, resolve_base_url},
    game::ReferralSettlement,
    models::PlayerView,
    state::AppState,
    storage::OnMissing,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemReferralRequest {
    /// Referral code of the inviting player (case-insensitive).
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemReferralResponse {
    /// Referee after the bonus.
    pub player: PlayerView,
    pub settlement: ReferralSettlement,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLink {
    pub code: String,
    pub url: String,
    /// Ready-made text for social sharing.
    pub share_text: String,
}

pub fn share_text(code: &str) -> String {
    format!("Play CLENXI Game and earn tokens! Use my referral code: {code}")
}

pub(crate) fn host_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(HOST).and_then(|v| v.to_str().ok())
}

#[utoipa::path(
    post,
    path = "/v1/players/{player}/referral",
    params(("player" = String, Path, description = "Player key or wallet address")),
    request_body = RedeemReferralRequest,
    tag = "Referrals",
    responses(
        (status = 200, body = RedeemReferralResponse),
        (status = 400, description = "Empty code or guest player"),
        (status = 404, description = "Player not found"),
        (status = 409, description = "Player already used a referral code"),
        (status = 422, description = "Player tried their own code")
    )
)]
pub async fn redeem_referral(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Json(request): Json<RedeemReferralRequest>,
) -> Result<Json<RedeemReferralResponse>, ApiError> {
    let key = parse_player(&player)?;
    require_connected(&key)?;
    let receipt = state
        .players
        .redeem_referral(&key, &request.code, Utc::now(), OnMissing::Reject)?;

    Ok(Json(RedeemReferralResponse {
        player: PlayerView::new(&key, receipt.record),
        settlement: receipt.settlement,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/players/{player}/referral-link",
    params(("player" = String, Path, description = "Wallet player key or address")),
    tag = "Referrals",
    responses(
        (status = 200, body = ReferralLink),
        (status = 400, description = "Only wallet players have referral links"),
        (status = 404, description = "Player not found")
    )
)]
pub async fn get_referral_link(
    State(state): State<AppState>,
    Path(player): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ReferralLink>, ApiError> {
    let key = parse_player(&player)?;
    if !key.is_wallet() {
        return Err(ApiError::bad_request(
            "Connect a wallet to get a referral link.",
        ));
    }
    let record = load_player(&state, &key)?;

    let base = resolve_base_url(&state.config, host_header(&headers));
    Ok(Json(ReferralLink {
        url: referral_url(&base, &record.referral_code),
        share_text: share_text(&record.referral_code),
        code: record.referral_code,
    }))
}
