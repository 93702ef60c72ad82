// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Farcaster Mini App metadata documents.

use axum::{
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL,
        },
        HeaderMap,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::referrals::host_header;
use crate::{
    frame::{logo_url, resolve_base_url, TAGLINE},
    state::AppState,
};

pub const MINIAPP_VERSION: &str = "1.0.0";
pub const METADATA_CACHE_CONTROL: &str = "public, max-age=3600";

const FARCASTER_PROFILE: &str = "https://farcaster.xyz/clenix.eth";
const PROJECT_WEBSITE: &str = "https://paragraph.com/@clenix/what-is-clenix";
const CATEGORIES: [&str; 3] = ["games", "defi", "social"];

#[derive(Debug, Serialize, ToSchema)]
pub struct FrameLink {
    pub enabled: bool,
    pub url: String,
}

impl FrameLink {
    fn for_base(base: &str) -> Self {
        Self {
            enabled: true,
            url: format!("{base}/api/frame"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManifestAuthor {
    pub name: String,
    pub url: String,
}

/// Mini app manifest served at `/api/miniapp` and `/manifest.json`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MiniAppManifest {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub url: String,
    pub version: String,
    pub author: ManifestAuthor,
    pub categories: Vec<String>,
    pub screenshots: Vec<String>,
    pub permissions: Vec<String>,
    pub frame: FrameLink,
}

impl MiniAppManifest {
    pub fn for_base(base: &str) -> Self {
        Self {
            name: "CLENXI Game".into(),
            description: TAGLINE.into(),
            icon: logo_url(base),
            url: base.into(),
            version: MINIAPP_VERSION.into(),
            author: ManifestAuthor {
                name: "CLENXI Team".into(),
                url: base.into(),
            },
            categories: CATEGORIES.map(String::from).to_vec(),
            screenshots: vec![logo_url(base)],
            permissions: vec!["identity".into(), "storage".into()],
            frame: FrameLink::for_base(base),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigAuthor {
    pub name: String,
    pub username: String,
    pub farcaster: String,
    pub website: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MiniAppEntry {
    pub enabled: bool,
    pub entrypoint: String,
    pub manifest: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SocialLinks {
    pub farcaster: String,
    pub website: String,
}

/// Farcaster client configuration served at `/api/farcaster/config`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FarcasterConfig {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub url: String,
    pub version: String,
    pub author: ConfigAuthor,
    pub categories: Vec<String>,
    pub permissions: Vec<String>,
    pub frame: FrameLink,
    pub miniapp: MiniAppEntry,
    pub social: SocialLinks,
}

impl FarcasterConfig {
    pub fn for_base(base: &str) -> Self {
        Self {
            name: "Clenxi".into(),
            description: format!("{TAGLINE} Community-driven Web3 project."),
            icon: logo_url(base),
            url: base.into(),
            version: MINIAPP_VERSION.into(),
            author: ConfigAuthor {
                name: "Clenxi".into(),
                username: "clenix.eth".into(),
                farcaster: FARCASTER_PROFILE.into(),
                website: PROJECT_WEBSITE.into(),
            },
            categories: CATEGORIES.map(String::from).to_vec(),
            permissions: vec!["identity".into(), "storage".into(), "wallet".into()],
            frame: FrameLink::for_base(base),
            miniapp: MiniAppEntry {
                enabled: true,
                entrypoint: base.into(),
                manifest: format!("{base}/manifest.json"),
            },
            social: SocialLinks {
                farcaster: FARCASTER_PROFILE.into(),
                website: PROJECT_WEBSITE.into(),
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/miniapp",
    tag = "Mini App",
    responses((status = 200, body = MiniAppManifest))
)]
pub async fn get_manifest(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let base = resolve_base_url(&state.config, host_header(&headers));
    (
        [(CACHE_CONTROL, METADATA_CACHE_CONTROL)],
        Json(MiniAppManifest::for_base(&base)),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/farcaster/config",
    tag = "Mini App",
    responses((status = 200, body = FarcasterConfig))
)]
pub async fn get_farcaster_config(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let base = resolve_base_url(&state.config, host_header(&headers));
    (
        [
            (CACHE_CONTROL, METADATA_CACHE_CONTROL),
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "GET"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
        Json(FarcasterConfig::for_base(&base)),
    )
        .into_response()
}
