// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::Value;

use crate::{
    error::ApiError,
    state::AppState,
    storage::{import_local_storage, ImportReport},
};

/// Import a browser local-storage export.
///
/// The body is the raw key/value map (`localStorage` dumped as JSON).
/// Keys that are not game records are counted as foreign and ignored.
#[utoipa::path(
    post,
    path = "/v1/import/local-storage",
    request_body(content = Object, description = "Local storage entries keyed by storage key"),
    tag = "Import",
    responses((status = 200, body = ImportReport))
)]
pub async fn import_local_storage_export(
    State(state): State<AppState>,
    Json(entries): Json<BTreeMap<String, Value>>,
) -> Result<Json<ImportReport>, ApiError> {
    let report = import_local_storage(state.players.as_ref(), entries, Utc::now())?;
    Ok(Json(report))
}
