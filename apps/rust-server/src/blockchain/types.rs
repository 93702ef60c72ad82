// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::WalletAddress;

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Public RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    pub currency_name: &'static str,
    pub currency_symbol: &'static str,
    pub currency_decimals: u8,
}

/// Base mainnet configuration.
pub const BASE_MAINNET: NetworkConfig = NetworkConfig {
    name: "Base",
    chain_id: 8453,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    currency_name: "Ethereum",
    currency_symbol: "ETH",
    currency_decimals: 18,
};

/// Reject any chain other than Base.
pub fn ensure_base_chain(chain_id: u64) -> Result<(), String> {
    if chain_id == BASE_MAINNET.chain_id {
        Ok(())
    } else {
        Err(format!(
            "Wrong network (chain {chain_id}). Please switch to {} network to continue.",
            BASE_MAINNET.name
        ))
    }
}

/// `0x`-prefixed lowercase hex form used by wallet RPC methods.
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Parse a wallet-reported chain id (`0x2105`). Plain decimal is accepted too.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

impl NetworkConfig {
    /// Explorer page of an address.
    pub fn address_url(&self, address: &WalletAddress) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    /// Parameters for `wallet_addEthereumChain` / `wallet_switchEthereumChain`.
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: chain_id_hex(self.chain_id),
            chain_name: self.name.to_string(),
            native_currency: NativeCurrency {
                name: self.currency_name.to_string(),
                symbol: self.currency_symbol.to_string(),
                decimals: self.currency_decimals,
            },
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }
}

/// Native currency descriptor (EIP-3085).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// `wallet_addEthereumChain` parameters (EIP-3085).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Hex chain id, e.g. `0x2105`
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Connected wallet as shown to the player.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: WalletAddress,
    /// Native balance with 4 decimals. Absent when no RPC endpoint is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    pub chain_id: u64,
    pub chain_name: String,
    pub explorer_url: String,
}

impl WalletInfo {
    pub fn new(address: WalletAddress, balance: Option<String>, network: &NetworkConfig) -> Self {
        let explorer_url = network.address_url(&address);
        Self {
            address,
            balance,
            chain_id: network.chain_id,
            chain_name: network.name.to_string(),
            explorer_url,
        }
    }
}
