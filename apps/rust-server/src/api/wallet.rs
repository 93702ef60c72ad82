// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    blockchain::{
        chain_id_hex, ensure_base_chain, parse_chain_id, resolve_event, AddChainParams,
        SessionAction, SwitchChainParams, WalletEvent, WalletInfo, BASE_MAINNET,
    },
    error::ApiError,
    game::{LedgerError, ReferralError, ReferralSettlement},
    models::{PlayerKey, PlayerView, WalletAddress},
    state::AppState,
    storage::OnMissing,
};

/// Chain id as reported by the wallet: hex string (`0x2105`) or number.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChainIdInput {
    Number(u64),
    Text(String),
}

impl ChainIdInput {
    pub fn resolve(&self) -> Option<u64> {
        match self {
            ChainIdInput::Number(id) => Some(*id),
            ChainIdInput::Text(raw) => parse_chain_id(raw),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWalletRequest {
    pub address: String,
    /// Wallet chain id, hex (`0x2105`) or decimal.
    #[schema(value_type = String)]
    pub chain_id: ChainIdInput,
    /// Code from the `?ref=` link the player arrived with.
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReferralStatus {
    Applied,
    OwnCode,
    AlreadyUsed,
}

/// What happened to the pending referral code on connect.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralOutcome {
    pub status: ReferralStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<ReferralSettlement>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWalletResponse {
    pub wallet: WalletInfo,
    pub player: PlayerView,
    /// True on the wallet's first connection.
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<ReferralOutcome>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletEventRequest {
    pub event: WalletEvent,
    /// Wallet the session is currently connected with, if any.
    pub current_address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub chain_id: u64,
    pub chain_id_hex: String,
    pub switch_params: SwitchChainParams,
    pub add_params: AddChainParams,
    /// Explorer page of `address`, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NetworkQuery {
    pub address: Option<String>,
}

fn parse_address(raw: &str) -> Result<WalletAddress, ApiError> {
    WalletAddress::parse(raw).map_err(ApiError::bad_request)
}

/// Wallet info for an address, served from cache when fresh.
async fn lookup_wallet(state: &AppState, address: &WalletAddress) -> Result<WalletInfo, ApiError> {
    if let Some(info) = state.wallet_cache.get(address.as_str()) {
        return Ok(info);
    }

    let Some(client) = &state.chain else {
        return Ok(WalletInfo::new(address.clone(), None, &BASE_MAINNET));
    };

    let balance = client.get_native_balance(address).await?;
    let info = WalletInfo::new(address.clone(), Some(balance), client.network());
    state.wallet_cache.put(info.clone());
    Ok(info)
}

#[utoipa::path(
    post,
    path = "/v1/wallet/connect",
    request_body = ConnectWalletRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = ConnectWalletResponse),
        (status = 400, description = "Malformed address or chain id"),
        (status = 409, description = "Wallet is not on Base"),
        (status = 503, description = "Base RPC unreachable")
    )
)]
pub async fn connect_wallet(
    State(state): State<AppState>,
    Json(request): Json<ConnectWalletRequest>,
) -> Result<Json<ConnectWalletResponse>, ApiError> {
    let address = parse_address(&request.address)?;
    let chain_id = request
        .chain_id
        .resolve()
        .ok_or_else(|| ApiError::bad_request("Invalid chain id"))?;
    ensure_base_chain(chain_id).map_err(ApiError::conflict)?;

    let wallet = lookup_wallet(&state, &address).await?;

    let now = Utc::now();
    let key = PlayerKey::Wallet(address.clone());
    let (mut record, created) = state.players.get_or_create(&key, now)?;

    let pending = request
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let referral = match pending {
        None => None,
        Some(code) => Some(
            match state
                .players
                .redeem_referral(&key, code, now, OnMissing::Reject)
            {
                Ok(receipt) => {
                    record = receipt.record;
                    ReferralOutcome {
                        status: ReferralStatus::Applied,
                        message: format!(
                            "You got {} $CLENXI from referral code: {}!",
                            receipt.settlement.bonus, receipt.settlement.code
                        ),
                        settlement: Some(receipt.settlement),
                    }
                }
                Err(LedgerError::Referral(err @ ReferralError::OwnCode)) => ReferralOutcome {
                    status: ReferralStatus::OwnCode,
                    message: err.to_string(),
                    settlement: None,
                },
                Err(LedgerError::Referral(err @ ReferralError::AlreadyUsed)) => ReferralOutcome {
                    status: ReferralStatus::AlreadyUsed,
                    message: err.to_string(),
                    settlement: None,
                },
                Err(e) => return Err(e.into()),
            },
        ),
    };

    tracing::info!(
        wallet = %address,
        created,
        referral = ?referral.as_ref().map(|r| r.status),
        "Wallet connected"
    );

    Ok(Json(ConnectWalletResponse {
        wallet,
        player: PlayerView::new(&key, record),
        created,
        referral,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/events",
    request_body = WalletEventRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = SessionAction),
        (status = 400, description = "Malformed account or chain id")
    )
)]
pub async fn wallet_event(
    State(state): State<AppState>,
    Json(request): Json<WalletEventRequest>,
) -> Result<Json<SessionAction>, ApiError> {
    let current = request
        .current_address
        .as_deref()
        .map(parse_address)
        .transpose()?;

    let action = resolve_event(&request.event, current.as_ref())?;

    match &action {
        SessionAction::Disconnect => {
            if let Some(current) = &current {
                state.wallet_cache.invalidate(current.as_str());
            }
        }
        SessionAction::Reconnect { address } => {
            state.wallet_cache.invalidate(address.as_str());
        }
        _ => {}
    }

    tracing::debug!(?action, "Wallet event resolved");
    Ok(Json(action))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/network",
    params(NetworkQuery),
    tag = "Wallet",
    responses((status = 200, body = NetworkResponse))
)]
pub async fn get_network(
    Query(query): Query<NetworkQuery>,
) -> Result<Json<NetworkResponse>, ApiError> {
    let explorer_url = query
        .address
        .as_deref()
        .map(parse_address)
        .transpose()?
        .map(|address| BASE_MAINNET.address_url(&address));

    let add_params = BASE_MAINNET.add_chain_params();
    Ok(Json(NetworkResponse {
        chain_id: BASE_MAINNET.chain_id,
        chain_id_hex: chain_id_hex(BASE_MAINNET.chain_id),
        switch_params: SwitchChainParams {
            chain_id: add_params.chain_id.clone(),
        },
        add_params,
        explorer_url,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/{address}",
    params(("address" = String, Path, description = "Wallet address")),
    tag = "Wallet",
    responses(
        (status = 200, body = WalletInfo),
        (status = 400, description = "Malformed address"),
        (status = 503, description = "Base RPC unreachable")
    )
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletInfo>, ApiError> {
    let address = parse_address(&address)?;
    Ok(Json(lookup_wallet(&state, &address).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const ALICE: &str = "0xabc0000000000000000000000000000000000123";
    const BOB: &str = "0xdef0000000000000000000000000000000000456";

    fn connect_request(address: &str, chain_id: ChainIdInput, code: Option<&str>) -> Json<ConnectWalletRequest> {
        Json(ConnectWalletRequest {
            address: address.to_string(),
            chain_id,
            referral_code: code.map(String::from),
        })
    }

    fn base() -> ChainIdInput {
        ChainIdInput::Text("0x2105".into())
    }

    #[test]
    fn chain_id_input_accepts_hex_and_numbers() {
        let hex: ChainIdInput = serde_json::from_str(r#""0x2105""#).unwrap();
        let num: ChainIdInput = serde_json::from_str("8453").unwrap();
        assert_eq!(hex.resolve(), Some(8453));
        assert_eq!(num.resolve(), Some(8453));
        assert_eq!(ChainIdInput::Text("base".into()).resolve(), None);
    }

    #[tokio::test]
    async fn first_connect_creates_player() {
        let state = AppState::default();

        let Json(response) = connect_wallet(State(state.clone()), connect_request(ALICE, base(), None))
            .await
            .unwrap();

        assert!(response.created);
        assert_eq!(response.player.referral_code, "ABC123");
        assert_eq!(response.wallet.chain_id, 8453);
        assert_eq!(response.wallet.chain_name, "Base");
        assert!(response.wallet.balance.is_none());
        assert!(response.referral.is_none());

        let Json(again) = connect_wallet(
            State(state),
            connect_request(ALICE, ChainIdInput::Number(8453), None),
        )
        .await
        .unwrap();
        assert!(!again.created);
    }

    #[tokio::test]
    async fn wrong_network_is_rejected() {
        let state = AppState::default();
        let err = connect_wallet(
            State(state.clone()),
            connect_request(ALICE, ChainIdInput::Text("0x1".into()), None),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.message.contains("switch to Base"));
        assert!(state.players.scan().unwrap().is_empty());

        let bad = connect_wallet(State(state), connect_request("0x12", base(), None))
            .await
            .unwrap_err();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pending_referral_is_settled_on_connect() {
        let state = AppState::default();
        connect_wallet(State(state.clone()), connect_request(ALICE, base(), None))
            .await
            .unwrap();

        let Json(bob) = connect_wallet(
            State(state.clone()),
            connect_request(BOB, base(), Some("abc123")),
        )
        .await
        .unwrap();

        let outcome = bob.referral.unwrap();
        assert_eq!(outcome.status, ReferralStatus::Applied);
        assert_eq!(outcome.message, "You got 5000 $CLENXI from referral code: ABC123!");
        assert_eq!(bob.player.balance, 5000);

        // Reconnecting with the same link reports, never fails
        let Json(again) = connect_wallet(
            State(state.clone()),
            connect_request(BOB, base(), Some("ABC123")),
        )
        .await
        .unwrap();
        assert_eq!(again.referral.unwrap().status, ReferralStatus::AlreadyUsed);
        assert_eq!(again.player.balance, 5000);

        let Json(own) = connect_wallet(State(state), connect_request(ALICE, base(), Some("ABC123")))
            .await
            .unwrap();
        assert_eq!(own.referral.unwrap().status, ReferralStatus::OwnCode);
        assert_eq!(own.player.balance, 5000);
    }

    #[tokio::test]
    async fn events_map_to_actions() {
        let state = AppState::default();

        let Json(action) = wallet_event(
            State(state.clone()),
            Json(WalletEventRequest {
                event: WalletEvent::AccountsChanged { accounts: vec![] },
                current_address: Some(ALICE.into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(action, SessionAction::Disconnect);

        let Json(action) = wallet_event(
            State(state.clone()),
            Json(WalletEventRequest {
                event: WalletEvent::ChainChanged {
                    chain_id: "0x89".into(),
                },
                current_address: None,
            }),
        )
        .await
        .unwrap();
        assert!(matches!(action, SessionAction::SwitchNetwork { .. }));

        let err = wallet_event(
            State(state),
            Json(WalletEventRequest {
                event: WalletEvent::ChainChanged {
                    chain_id: "polygon".into(),
                },
                current_address: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn network_params_and_explorer_link() {
        let Json(network) = get_network(Query(NetworkQuery {
            address: Some(ALICE.into()),
        }))
        .await
        .unwrap();

        assert_eq!(network.chain_id_hex, "0x2105");
        assert_eq!(network.switch_params.chain_id, "0x2105");
        assert_eq!(network.add_params.rpc_urls, vec!["https://mainnet.base.org"]);
        assert_eq!(
            network.explorer_url.as_deref(),
            Some("https://basescan.org/address/0xabc0000000000000000000000000000000000123")
        );
    }

    #[tokio::test]
    async fn wallet_lookup_without_rpc_has_no_balance() {
        let Json(info) = get_wallet(State(AppState::default()), Path(ALICE.into()))
            .await
            .unwrap();
        assert!(info.balance.is_none());
        assert_eq!(info.address.as_str(), ALICE);
    }
}
