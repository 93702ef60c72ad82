// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clenxi - Daily Claim & Referral Rewards Server
//!
//! Backend for the Clenxi Farcaster Mini App: players claim 1000 $CLENXI
//! once per day and earn 5000 $CLENXI per referral. Wallet players
//! connect on Base.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum), Frame and Mini App routes
//! - `blockchain` - Base network constants, balance lookups, wallet sessions
//! - `frame` - Farcaster Frame HTML rendering
//! - `game` - Claim, referral and leaderboard rules
//! - `storage` - Player repository (redb or in-memory) and legacy import

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod frame;
pub mod game;
pub mod models;
pub mod state;
pub mod storage;
