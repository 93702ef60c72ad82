// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Shared identifier types and the player view returned by the REST API.
//! Request/response types that belong to a single endpoint live next to
//! their handler in [`crate::api`].
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters). Addresses are normalised to lowercase so that the
//! same wallet always maps to the same player record.
//!
//! ## Player Keys
//!
//! Every player record is stored under a [`PlayerKey`]: a wallet address, a
//! Farcaster id (players created through the Frame routes), or the single
//! guest record used when no wallet is connected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::game::PlayerRecord;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes), stored
/// lowercase.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// assert_eq!(addr.as_str(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and normalise a raw address string.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| format!("Invalid wallet address `{trimmed}`: missing 0x prefix"))?;

        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Invalid wallet address `{trimmed}`: expected 40 hex characters"
            ));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form used by the UI, e.g. `0x742d...ab12`.
    pub fn truncated(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for WalletAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Player Key
// =============================================================================

/// Storage key of a player record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlayerKey {
    /// A player identified by a connected wallet.
    Wallet(WalletAddress),
    /// A player created through the Farcaster Frame routes.
    Fid(u64),
    /// The generic record used when no wallet is connected.
    Guest,
}

const WALLET_PREFIX: &str = "wallet:";
const FID_PREFIX: &str = "fid:";
const GUEST_KEY: &str = "guest";

impl PlayerKey {
    pub fn wallet(&self) -> Option<&WalletAddress> {
        match self {
            PlayerKey::Wallet(address) => Some(address),
            _ => None,
        }
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self, PlayerKey::Wallet(_))
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKey::Wallet(address) => write!(f, "{WALLET_PREFIX}{address}"),
            PlayerKey::Fid(fid) => write!(f, "{FID_PREFIX}{fid}"),
            PlayerKey::Guest => f.write_str(GUEST_KEY),
        }
    }
}

impl FromStr for PlayerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == GUEST_KEY {
            return Ok(PlayerKey::Guest);
        }
        if let Some(address) = s.strip_prefix(WALLET_PREFIX) {
            return WalletAddress::parse(address).map(PlayerKey::Wallet);
        }
        if let Some(fid) = s.strip_prefix(FID_PREFIX) {
            return fid
                .parse::<u64>()
                .map(PlayerKey::Fid)
                .map_err(|e| format!("Invalid fid in player key `{s}`: {e}"));
        }
        Err(format!("Unknown player key `{s}`"))
    }
}

impl TryFrom<String> for PlayerKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerKey> for String {
    fn from(value: PlayerKey) -> Self {
        value.to_string()
    }
}

impl From<WalletAddress> for PlayerKey {
    fn from(value: WalletAddress) -> Self {
        PlayerKey::Wallet(value)
    }
}

// =============================================================================
// Player View
// =============================================================================

/// Player record as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Storage key of the player (`wallet:0x…`, `fid:…` or `guest`).
    pub player: String,
    /// Spendable in-game balance.
    pub balance: u64,
    /// Time of the last successful daily claim.
    pub last_claim: Option<DateTime<Utc>>,
    /// Number of players who redeemed this player's code.
    pub referral_count: u64,
    /// Lifetime earnings.
    pub total_earned: u64,
    /// This player's referral code.
    pub referral_code: String,
    /// Whether this player already redeemed someone else's code.
    pub has_used_referral: bool,
}

impl PlayerView {
    pub fn new(key: &PlayerKey, record: PlayerRecord) -> Self {
        Self {
            player: key.to_string(),
            balance: record.balance,
            last_claim: record.last_claim,
            referral_count: record.referral_count,
            total_earned: record.total_earned,
            referral_code: record.referral_code,
            has_used_referral: record.has_used_referral,
        }
    }
}
