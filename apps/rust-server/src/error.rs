// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::{ChainClientError, SessionError};
use crate::game::{ClaimError, LedgerError, ReferralError};
use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Player storage failure");
        ApiError::internal("Failed to access player storage")
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        ApiError::too_many_requests(err.to_string())
    }
}

impl From<ReferralError> for ApiError {
    fn from(err: ReferralError) -> Self {
        match err {
            ReferralError::EmptyCode => ApiError::bad_request(err.to_string()),
            ReferralError::OwnCode => ApiError::unprocessable(err.to_string()),
            ReferralError::AlreadyUsed => ApiError::conflict(err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Storage(e) => e.into(),
            LedgerError::Claim(e) => e.into(),
            LedgerError::Referral(e) => e.into(),
            LedgerError::PlayerNotFound(key) => {
                ApiError::not_found(format!("Player {key} not found. Connect a wallet first."))
            }
        }
    }
}

impl From<ChainClientError> for ApiError {
    fn from(err: ChainClientError) -> Self {
        match err {
            ChainClientError::InvalidAddress(_) => ApiError::bad_request(err.to_string()),
            _ => {
                tracing::warn!(error = %err, "Base RPC request failed");
                ApiError::service_unavailable("Base network is unreachable. Try again shortly.")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::Duration;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let conflict = ApiError::conflict("taken");
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let unavailable = ApiError::service_unavailable("down");
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        let too_early: ApiError = LedgerError::Claim(ClaimError::TooEarly {
            remaining: Duration::minutes(5),
        })
        .into();
        assert_eq!(too_early.status, StatusCode::TOO_MANY_REQUESTS);

        let own: ApiError = LedgerError::Referral(ReferralError::OwnCode).into();
        assert_eq!(own.status, StatusCode::UNPROCESSABLE_ENTITY);

        let used: ApiError = LedgerError::Referral(ReferralError::AlreadyUsed).into();
        assert_eq!(used.status, StatusCode::CONFLICT);

        let missing: ApiError = LedgerError::PlayerNotFound("wallet:0xabc".into()).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn rpc_failures_are_unavailable() {
        let err: ApiError = ChainClientError::RpcError("timeout".into()).into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = SessionError::InvalidChainId("0xzz".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
