// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Base JSON-RPC client for wallet balance lookups.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::types::*;
use crate::models::WalletAddress;

/// Decimal places shown for native balances.
pub const BALANCE_DISPLAY_DECIMALS: u32 = 4;

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read-only Base client.
pub struct BaseClient {
    network: NetworkConfig,
    provider: HttpProvider,
}

impl BaseClient {
    /// Create a client talking to `rpc_url` for the given network.
    pub fn new(rpc_url: &str, network: NetworkConfig) -> Result<Self, ChainClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Client for Base mainnet through `rpc_url`.
    pub fn base(rpc_url: &str) -> Result<Self, ChainClientError> {
        Self::new(rpc_url, BASE_MAINNET)
    }

    /// Native balance of an address, formatted with 4 decimals.
    pub async fn get_native_balance(
        &self,
        address: &WalletAddress,
    ) -> Result<String, ChainClientError> {
        let addr = address
            .as_str()
            .parse::<Address>()
            .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))?;

        let balance = self
            .provider
            .get_balance(addr)
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))?;

        Ok(format_balance(balance, self.network.currency_decimals))
    }

    /// Chain id reported by the node.
    pub async fn get_chain_id(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

/// Format a balance with exactly 4 decimal places, rounding half up.
pub fn format_balance(balance: U256, decimals: u8) -> String {
    let precision = U256::from(10u64).pow(U256::from(BALANCE_DISPLAY_DECIMALS));
    let divisor = U256::from(10u64).pow(U256::from(decimals));

    let scaled = balance
        .saturating_mul(precision)
        .saturating_add(divisor / U256::from(2u64))
        / divisor;
    let whole = scaled / precision;
    let fraction = scaled % precision;

    format!(
        "{}.{:0>width$}",
        whole,
        fraction.to_string(),
        width = BALANCE_DISPLAY_DECIMALS as usize
    )
}

/// Errors that can occur during RPC lookups.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balance() {
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_balance(one_eth, 18), "1.0000");

        let half = U256::from(500_000_000_000_000_000u64);
        assert_eq!(format_balance(half, 18), "0.5000");

        // 1.23456789 ETH rounds to 4 places
        let complex = U256::from(1_234_567_890_000_000_000u64);
        assert_eq!(format_balance(complex, 18), "1.2346");

        assert_eq!(format_balance(U256::ZERO, 18), "0.0000");

        // 0.00004 ETH rounds down, 0.00005 rounds up
        assert_eq!(format_balance(U256::from(40_000_000_000_000u64), 18), "0.0000");
        assert_eq!(format_balance(U256::from(50_000_000_000_000u64), 18), "0.0001");
    }

    #[test]
    fn rejects_invalid_rpc_url() {
        let err = BaseClient::base("not a url").err().unwrap();
        assert!(matches!(err, ChainClientError::InvalidRpcUrl(_)));
    }

    #[tokio::test]
    async fn client_keeps_network() {
        let client = BaseClient::base("https://mainnet.base.org").unwrap();
        assert_eq!(client.network().chain_id, 8453);
    }
}
