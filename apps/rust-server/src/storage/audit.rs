// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger events for balance-changing operations.
//!
//! Every claim, referral credit, player creation and legacy import appends
//! one event. Repositories write the event in the same transaction as the
//! record it describes, so the ledger never disagrees with the balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::PlayerKey;

/// Types of ledger events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEventType {
    PlayerCreated,
    DailyClaim,
    ReferralBonus,
    ReferrerCredit,
    LegacyImport,
}

/// A ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: LedgerEventType,
    /// Player key the event belongs to.
    pub player: String,
    /// Tokens credited by this event (0 for bookkeeping events).
    pub amount: u64,
    /// Additional details as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl LedgerEvent {
    /// Create a new ledger event.
    pub fn new(event_type: LedgerEventType, player: &PlayerKey, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            event_type,
            player: player.to_string(),
            amount: 0,
            details: None,
        }
    }

    /// `player_created` event for a record created by an operation at `now`.
    ///
    /// Stamped one millisecond earlier so newest-first listings put it
    /// after the event that created the player.
    pub fn created_before(player: &PlayerKey, now: DateTime<Utc>) -> Self {
        Self::new(
            LedgerEventType::PlayerCreated,
            player,
            now - chrono::Duration::milliseconds(1),
        )
    }

    /// Set the credited amount.
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
