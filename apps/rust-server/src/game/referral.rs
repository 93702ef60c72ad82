// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Referral redemption rules.
//!
//! Settlement touches two records: the referee (the player redeeming a
//! code) and the referrer (the owner of the code). Repositories run both
//! updates in one write transaction; this module only decides what each
//! side receives.

use serde::Serialize;
use utoipa::ToSchema;

use super::{PlayerRecord, REFERRAL_BONUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReferralError {
    #[error("Referral code is empty")]
    EmptyCode,

    #[error("You cannot use your own referral code")]
    OwnCode,

    #[error("You have already used a referral code before")]
    AlreadyUsed,
}

/// Result of a successful referral redemption.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSettlement {
    /// The (normalised) code that was redeemed.
    pub code: String,
    /// Bonus credited to each side.
    pub bonus: u64,
    /// Player key of the referrer, when the code belongs to a known player.
    pub referrer: Option<String>,
    /// Whether the referrer was credited. False when the code is unknown;
    /// the referee keeps the bonus either way.
    pub referrer_credited: bool,
}

/// Trim and upper-case a user supplied code.
pub fn normalize_code(raw: &str) -> Result<String, ReferralError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() {
        Err(ReferralError::EmptyCode)
    } else {
        Ok(code)
    }
}

impl PlayerRecord {
    /// Validate that this player may redeem `code` (already normalised).
    ///
    /// A player who already used a referral gets `AlreadyUsed` even for
    /// their own code.
    pub fn check_referral(&self, code: &str) -> Result<(), ReferralError> {
        if self.has_used_referral {
            return Err(ReferralError::AlreadyUsed);
        }
        if code == self.referral_code {
            return Err(ReferralError::OwnCode);
        }
        Ok(())
    }

    /// Referee side: credit the bonus and mark the referral as used.
    pub fn apply_referral_bonus(&mut self, code: &str) -> Result<(), ReferralError> {
        self.check_referral(code)?;
        self.balance = self.balance.saturating_add(REFERRAL_BONUS);
        self.total_earned = self.total_earned.saturating_add(REFERRAL_BONUS);
        self.has_used_referral = true;
        Ok(())
    }

    /// Referrer side: credit the bonus and count the referral.
    pub fn credit_referrer(&mut self) {
        self.balance = self.balance.saturating_add(REFERRAL_BONUS);
        self.total_earned = self.total_earned.saturating_add(REFERRAL_BONUS);
        self.referral_count = self.referral_count.saturating_add(1);
    }
}
