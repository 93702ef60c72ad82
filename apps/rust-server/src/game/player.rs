// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted player record and referral code derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PlayerKey, WalletAddress};

/// Game state of one player.
///
/// Serialized with the camelCase field names used by the browser build so
/// that exported local-storage entries load unchanged. Every field has a
/// default because older entries omit `hasUsedReferral` and sometimes the
/// counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub last_claim: Option<DateTime<Utc>>,
    #[serde(default)]
    pub referral_count: u64,
    #[serde(default)]
    pub total_earned: u64,
    #[serde(default)]
    pub referral_code: String,
    #[serde(default)]
    pub has_used_referral: bool,
}

impl PlayerRecord {
    /// Fresh record for a player that has never played.
    pub fn new_for(key: &PlayerKey) -> Self {
        Self {
            referral_code: referral_code_for(key),
            ..Self::default()
        }
    }

    /// Fill in the derived referral code when a stored record has none.
    pub fn ensure_referral_code(&mut self, key: &PlayerKey) {
        if self.referral_code.is_empty() {
            self.referral_code = referral_code_for(key);
        }
    }
}

/// Referral code for a wallet: first and last three hex digits, upper-cased.
///
/// `0x742d35cc…95f4ab12` becomes `742B12`. Codes are short and therefore
/// not unique across players.
pub fn referral_code_for_address(address: &WalletAddress) -> String {
    let hex = address.as_str().trim_start_matches("0x");
    format!("{}{}", &hex[..3], &hex[hex.len() - 3..]).to_ascii_uppercase()
}

/// Referral code owned by a player key. The guest record has none.
pub fn referral_code_for(key: &PlayerKey) -> String {
    match key {
        PlayerKey::Wallet(address) => referral_code_for_address(address),
        PlayerKey::Fid(fid) => format!("FC{fid}"),
        PlayerKey::Guest => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_code_uses_first_and_last_three_hex_chars() {
        let addr = WalletAddress::parse("0xABC4567890123456789012345678901234567123").unwrap();
        assert_eq!(referral_code_for_address(&addr), "ABC123");
    }

    #[test]
    fn codes_per_key_kind() {
        assert_eq!(referral_code_for(&PlayerKey::Fid(42)), "FC42");
        assert_eq!(referral_code_for(&PlayerKey::Guest), "");
    }

    #[test]
    fn legacy_json_fills_defaults() {
        let record: PlayerRecord = serde_json::from_str(
            r#"{"balance":6000,"lastClaim":"2025-03-01T10:00:00.000Z","totalEarned":6000,"referralCode":"ABC123"}"#,
        )
        .unwrap();

        assert_eq!(record.balance, 6000);
        assert_eq!(record.referral_count, 0);
        assert!(!record.has_used_referral);
        assert!(record.last_claim.is_some());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = PlayerRecord::new_for(&PlayerKey::Fid(7));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["referralCode"], "FC7");
        assert_eq!(json["hasUsedReferral"], false);
        assert!(json["lastClaim"].is_null());
    }

    #[test]
    fn ensure_referral_code_only_fills_blank() {
        let key = PlayerKey::Fid(9);
        let mut blank = PlayerRecord::default();
        blank.ensure_referral_code(&key);
        assert_eq!(blank.referral_code, "FC9");

        let mut custom = PlayerRecord {
            referral_code: "KEEPME".into(),
            ..PlayerRecord::default()
        };
        custom.ensure_referral_code(&key);
        assert_eq!(custom.referral_code, "KEEPME");
    }
}
