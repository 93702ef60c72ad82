// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{
        AddChainParams, NativeCurrency, SessionAction, SwitchChainParams, WalletEvent, WalletInfo,
    },
    game::{ClaimEligibility, LeaderboardEntry, ReferralSettlement, Standings},
    models::{PlayerView, WalletAddress},
    state::AppState,
    storage::{ImportReport, LedgerEvent, LedgerEventType},
};

pub mod claims;
pub mod frame;
pub mod health;
pub mod import;
pub mod leaderboard;
pub mod miniapp;
pub mod players;
pub mod referrals;
pub mod wallet;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/players/{player}", get(players::get_player))
        .route("/players/{player}/events", get(players::list_player_events))
        .route(
            "/players/{player}/claim",
            get(claims::get_claim_status).post(claims::claim_daily),
        )
        .route("/players/{player}/referral", post(referrals::redeem_referral))
        .route(
            "/players/{player}/referral-link",
            get(referrals::get_referral_link),
        )
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/wallet/connect", post(wallet::connect_wallet))
        .route("/wallet/events", post(wallet::wallet_event))
        .route("/wallet/network", get(wallet::get_network))
        .route("/wallet/{address}", get(wallet::get_wallet))
        .route(
            "/import/local-storage",
            post(import::import_local_storage_export),
        );

    let frame_routes = Router::new()
        .route("/frame", get(frame::frame_landing).post(frame::frame_action))
        .route("/frame/claim", post(frame::frame_claim))
        .route("/frame/referral", post(frame::frame_referral))
        .route("/miniapp", get(miniapp::get_manifest))
        .route("/farcaster/config", get(miniapp::get_farcaster_config));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/manifest.json", get(miniapp::get_manifest))
        .nest("/v1", v1_routes)
        .nest("/api", frame_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        players::get_player,
        players::list_player_events,
        claims::get_claim_status,
        claims::claim_daily,
        referrals::redeem_referral,
        referrals::get_referral_link,
        leaderboard::get_leaderboard,
        wallet::connect_wallet,
        wallet::wallet_event,
        wallet::get_network,
        wallet::get_wallet,
        import::import_local_storage_export,
        frame::frame_landing,
        frame::frame_action,
        frame::frame_claim,
        frame::frame_referral,
        miniapp::get_manifest,
        miniapp::get_farcaster_config
    ),
    components(
        schemas(
            WalletAddress,
            PlayerView,
            ClaimEligibility,
            ReferralSettlement,
            LeaderboardEntry,
            Standings,
            LedgerEvent,
            LedgerEventType,
            ImportReport,
            WalletInfo,
            NativeCurrency,
            AddChainParams,
            SwitchChainParams,
            WalletEvent,
            SessionAction,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            claims::ClaimResponse,
            referrals::RedeemReferralRequest,
            referrals::RedeemReferralResponse,
            referrals::ReferralLink,
            wallet::ConnectWalletRequest,
            wallet::ConnectWalletResponse,
            wallet::ReferralStatus,
            wallet::ReferralOutcome,
            wallet::WalletEventRequest,
            wallet::NetworkResponse,
            miniapp::MiniAppManifest,
            miniapp::FarcasterConfig
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Players", description = "Player records and ledger history"),
        (name = "Claims", description = "Daily claim"),
        (name = "Referrals", description = "Referral redemption and links"),
        (name = "Leaderboard", description = "Wallet player standings"),
        (name = "Wallet", description = "Base wallet connection"),
        (name = "Import", description = "Browser local-storage migration"),
        (name = "Frame", description = "Farcaster Frame endpoints"),
        (name = "Mini App", description = "Farcaster Mini App metadata")
    )
)]
struct ApiDoc;
