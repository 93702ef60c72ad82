// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Daily claim window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{PlayerRecord, DAILY_CLAIM_REWARD};

/// Length of the claim window in milliseconds (24 hours).
pub const CLAIM_WINDOW_MS: i64 = 86_400_000;

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("Already claimed today. Come back in {}", format_wait(*.remaining))]
    TooEarly { remaining: Duration },
}

/// Whether a player may claim right now.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEligibility {
    /// True when the daily reward can be claimed now.
    pub can_claim: bool,
    /// Earliest time of the next claim (absent when never claimed).
    pub next_claim_at: Option<DateTime<Utc>>,
    /// Milliseconds until the next claim; 0 when claimable.
    pub remaining_ms: i64,
    /// Human readable wait, e.g. `"3h 12m"`; absent when claimable.
    pub wait_label: Option<String>,
}

/// Evaluate the claim window for `last_claim` at `now`.
pub fn check_eligibility(last_claim: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ClaimEligibility {
    let Some(last) = last_claim else {
        return ClaimEligibility {
            can_claim: true,
            next_claim_at: None,
            remaining_ms: 0,
            wait_label: None,
        };
    };

    let window = Duration::milliseconds(CLAIM_WINDOW_MS);
    let next = last + window;
    let elapsed = now - last;

    if elapsed >= window {
        ClaimEligibility {
            can_claim: true,
            next_claim_at: Some(next),
            remaining_ms: 0,
            wait_label: None,
        }
    } else {
        let remaining = window - elapsed;
        ClaimEligibility {
            can_claim: false,
            next_claim_at: Some(next),
            remaining_ms: remaining.num_milliseconds(),
            wait_label: Some(format_wait(remaining)),
        }
    }
}

/// Format a wait as whole hours plus minutes rounded up.
pub fn format_wait(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    let mut hours = ms / HOUR_MS;
    let mut minutes = (ms % HOUR_MS + MINUTE_MS - 1) / MINUTE_MS;
    if minutes == 60 {
        hours += 1;
        minutes = 0;
    }
    format!("{hours}h {minutes}m")
}

impl PlayerRecord {
    /// Grant the daily reward if the claim window has elapsed.
    ///
    /// A rejected claim leaves the record untouched.
    pub fn apply_claim(&mut self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        let eligibility = check_eligibility(self.last_claim, now);
        if !eligibility.can_claim {
            return Err(ClaimError::TooEarly {
                remaining: Duration::milliseconds(eligibility.remaining_ms),
            });
        }

        self.balance = self.balance.saturating_add(DAILY_CLAIM_REWARD);
        self.total_earned = self.total_earned.saturating_add(DAILY_CLAIM_REWARD);
        self.last_claim = Some(now);
        Ok(())
    }
}
