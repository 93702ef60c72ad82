// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Game Rules
//!
//! Pure reward rules for the Clenxi daily-claim and referral game. Nothing in
//! this module touches storage: repositories load records, apply these
//! rules inside a write transaction and persist the result.
//!
//! | Action | Effect |
//! |--------|--------|
//! | Daily claim | +1000 balance/total earned, at most once per 24h |
//! | Referral (referee) | +5000 balance/total earned, once per player |
//! | Referral (referrer) | +5000 balance/total earned, +1 referral count |

pub mod claim;
pub mod leaderboard;
pub mod player;
pub mod referral;

pub use claim::{check_eligibility, format_wait, ClaimEligibility, ClaimError, CLAIM_WINDOW_MS};
pub use leaderboard::{rank_players, LeaderboardEntry, Standings};
pub use player::{referral_code_for, referral_code_for_address, PlayerRecord};
pub use referral::{normalize_code, ReferralError, ReferralSettlement};

use crate::storage::StorageError;

/// Tokens granted by one daily claim.
pub const DAILY_CLAIM_REWARD: u64 = 1_000;

/// Tokens granted to each side of a successful referral.
pub const REFERRAL_BONUS: u64 = 5_000;

/// Errors returned by repository operations that apply game rules.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Referral(#[from] ReferralError),

    #[error("player not found: {0}")]
    PlayerNotFound(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
