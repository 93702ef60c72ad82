// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Farcaster Frame endpoints.
//!
//! Frame actions carry `untrustedData.fid`. Signatures are not verified, so
//! the FID is taken at face value.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use super::referrals::host_header;
use crate::{
    error::ApiError,
    frame::{
        landing_frame, logo_url, redirect_frame, referral_url, resolve_base_url, result_frame,
        FrameButton, FrameDocument,
    },
    game::{ClaimError, LedgerError, ReferralError, DAILY_CLAIM_REWARD, REFERRAL_BONUS},
    models::PlayerKey,
    state::AppState,
    storage::OnMissing,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct FrameQuery {
    /// Referral code to carry into the game link.
    #[serde(rename = "ref")]
    #[param(rename = "ref")]
    pub referral: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameActionBody {
    #[serde(default)]
    untrusted_data: UntrustedData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UntrustedData {
    fid: Option<u64>,
    input_text: Option<String>,
}

fn parse_action(body: &[u8]) -> Option<FrameActionBody> {
    match serde_json::from_slice(body) {
        Ok(action) => Some(action),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable frame action");
            None
        }
    }
}

fn html(document: &FrameDocument) -> Response {
    (
        [
            (CONTENT_TYPE, "text/html; charset=utf-8"),
            (CACHE_CONTROL, "max-age=0"),
        ],
        document.render(),
    )
        .into_response()
}

fn redirect_to(base: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, base.to_string())]).into_response()
}

#[utoipa::path(
    get,
    path = "/api/frame",
    params(FrameQuery),
    tag = "Frame",
    responses((status = 200, description = "Frame HTML", content_type = "text/html"))
)]
pub async fn frame_landing(
    State(state): State<AppState>,
    Query(query): Query<FrameQuery>,
    headers: HeaderMap,
) -> Response {
    let base = resolve_base_url(&state.config, host_header(&headers));
    let referral = query
        .referral
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());
    html(&landing_frame(&base, referral))
}

#[utoipa::path(
    post,
    path = "/api/frame",
    request_body(content = String, content_type = "application/json", description = "Frame action with `untrustedData`"),
    tag = "Frame",
    responses(
        (status = 200, description = "Redirect frame HTML", content_type = "text/html"),
        (status = 302, description = "Unreadable frame action")
    )
)]
pub async fn frame_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let base = resolve_base_url(&state.config, host_header(&headers));
    let Some(action) = parse_action(&body) else {
        return redirect_to(&base);
    };

    let target = match action.untrusted_data.fid {
        Some(fid) => referral_url(&base, &format!("FC{fid}")),
        None => base.clone(),
    };
    html(&redirect_frame(&base, &target))
}

#[utoipa::path(
    post,
    path = "/api/frame/claim",
    request_body(content = String, content_type = "application/json", description = "Frame action with `untrustedData`"),
    tag = "Frame",
    responses(
        (status = 200, description = "Claim result frame HTML", content_type = "text/html"),
        (status = 302, description = "Unreadable frame action or missing FID")
    )
)]
pub async fn frame_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let base = resolve_base_url(&state.config, host_header(&headers));
    let Some(fid) = parse_action(&body).and_then(|a| a.untrusted_data.fid) else {
        return Ok(redirect_to(&base));
    };

    let key = PlayerKey::Fid(fid);
    let document = match state.players.claim(&key, Utc::now(), OnMissing::Create) {
        Ok(_) => result_frame(
            &base,
            "Clenxi - Daily Claim Success!",
            &format!("You claimed {DAILY_CLAIM_REWARD} $CLENXI successfully!"),
        )
        .redirect(base.as_str()),
        Err(LedgerError::Claim(err @ ClaimError::TooEarly { .. })) => {
            result_frame(&base, "Clenxi - Already Claimed", &err.to_string())
        }
        Err(e) => return Err(e.into()),
    };

    Ok(html(&document))
}

#[utoipa::path(
    post,
    path = "/api/frame/referral",
    request_body(content = String, content_type = "application/json", description = "Frame action with `untrustedData`"),
    tag = "Frame",
    responses(
        (status = 200, description = "Referral result frame HTML", content_type = "text/html"),
        (status = 302, description = "Unreadable frame action or missing FID")
    )
)]
pub async fn frame_referral(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let base = resolve_base_url(&state.config, host_header(&headers));
    let Some(action) = parse_action(&body) else {
        return Ok(redirect_to(&base));
    };
    let Some(fid) = action.untrusted_data.fid else {
        return Ok(redirect_to(&base));
    };

    let referrer_fid = action
        .untrusted_data
        .input_text
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if referrer_fid.is_empty() {
        let prompt = FrameDocument::new(
            "Enter a referral",
            "Type your friend's FID to claim the referral bonus.",
            logo_url(&base),
        )
        .input("Friend's FID")
        .button(FrameButton::post(
            "🎁 Claim Referral",
            format!("{base}/api/frame/referral"),
        ));
        return Ok(html(&prompt));
    }

    let code = format!("FC{referrer_fid}");
    let key = PlayerKey::Fid(fid);
    let document = match state
        .players
        .redeem_referral(&key, &code, Utc::now(), OnMissing::Create)
    {
        Ok(receipt) => result_frame(
            &base,
            "Referral Bonus Activated!",
            &format!("You and your friend earned {REFERRAL_BONUS} $CLENXI!"),
        )
        .redirect(referral_url(&base, &receipt.settlement.code)),
        Err(LedgerError::Referral(ReferralError::AlreadyUsed)) => result_frame(
            &base,
            "Already Used Referral",
            "You've already used a referral code.",
        ),
        Err(LedgerError::Referral(err @ ReferralError::OwnCode)) => {
            result_frame(&base, "Own Referral Code", &err.to_string())
        }
        Err(e) => return Err(e.into()),
    };

    Ok(html(&document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{header::HOST, HeaderValue};

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("clenxi.example"));
        headers
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn action(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    #[tokio::test]
    async fn landing_frame_links_with_referral() {
        let response = frame_landing(
            State(AppState::default()),
            Query(FrameQuery {
                referral: Some("ABC123".into()),
            }),
            headers(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=0");
        let html = body_text(response).await;
        assert!(html.contains(r#"content="https://clenxi.example?ref=ABC123""#));
        assert!(html.contains(r#"content="https://clenxi.example/api/frame""#));
    }

    #[tokio::test]
    async fn frame_action_targets_fid_code() {
        let response = frame_action(
            State(AppState::default()),
            headers(),
            action(r#"{"untrustedData":{"fid":42,"buttonIndex":1}}"#),
        )
        .await;

        let html = body_text(response).await;
        assert!(html.contains("https://clenxi.example?ref=FC42"));
        assert!(html.contains("window.location.href"));
    }

    #[tokio::test]
    async fn unreadable_body_redirects() {
        let response = frame_action(State(AppState::default()), headers(), action("not json")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://clenxi.example");

        let response = frame_claim(State(AppState::default()), headers(), action("{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn frame_claim_then_wait() {
        let state = AppState::default();
        let body = r#"{"untrustedData":{"fid":7}}"#;

        let response = frame_claim(State(state.clone()), headers(), action(body))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Daily Claim Success!"));
        assert_eq!(
            state.players.get(&PlayerKey::Fid(7)).unwrap().unwrap().balance,
            1000
        );

        let response = frame_claim(State(state.clone()), headers(), action(body))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Already claimed today. Come back in"));
        assert_eq!(
            state.players.get(&PlayerKey::Fid(7)).unwrap().unwrap().balance,
            1000
        );
    }

    #[tokio::test]
    async fn frame_referral_flow() {
        let state = AppState::default();
        state
            .players
            .get_or_create(&PlayerKey::Fid(100), Utc::now())
            .unwrap();

        let body = r#"{"untrustedData":{"fid":200,"inputText":" 100 "}}"#;
        let response = frame_referral(State(state.clone()), headers(), action(body))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Referral Bonus Activated!"));
        assert!(html.contains("https://clenxi.example?ref=FC100"));

        let referrer = state.players.get(&PlayerKey::Fid(100)).unwrap().unwrap();
        assert_eq!(referrer.balance, 5000);
        assert_eq!(referrer.referral_count, 1);

        let response = frame_referral(State(state.clone()), headers(), action(body))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Already Used Referral"));

        let own = r#"{"untrustedData":{"fid":100,"inputText":"100"}}"#;
        let response = frame_referral(State(state), headers(), action(own))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Own Referral Code"));
    }

    #[tokio::test]
    async fn frame_referral_without_input_prompts() {
        let body = r#"{"untrustedData":{"fid":5}}"#;
        let response = frame_referral(State(AppState::default()), headers(), action(body))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains(r#"property="fc:frame:input:text""#));
        assert!(html.contains(r#"content="post""#));
    }
}
