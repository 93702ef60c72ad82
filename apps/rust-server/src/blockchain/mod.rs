// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for the Base L2.
//!
//! This module provides functionality for:
//! - Network constants and `wallet_addEthereumChain` parameters
//! - Querying native ETH balances over JSON-RPC
//! - Resolving wallet provider events into session actions

pub mod client;
pub mod session;
pub mod types;

pub use client::{BaseClient, ChainClientError};
pub use session::{resolve_event, SessionAction, SessionError, SwitchChainParams, WalletEvent};
pub use types::*;
