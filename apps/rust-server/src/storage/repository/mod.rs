// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository interface for player records.
//!
//! Handlers never talk to a concrete store. They receive an
//! `Arc<dyn PlayerRepository>` through [`crate::state::AppState`], which is
//! backed by [`PlayerDatabase`](super::PlayerDatabase) in production and by
//! [`MemoryPlayerStore`](super::MemoryPlayerStore) when no data directory is
//! configured.
//!
//! Besides plain reads and scans, the trait exposes the two rule-applying
//! operations (`claim`, `redeem_referral`) so each backend can run the
//! read-modify-write of every touched record as one unit.

use chrono::{DateTime, Utc};

use super::{LedgerEvent, StorageResult};
use crate::game::{LedgerResult, PlayerRecord, ReferralSettlement};
use crate::models::PlayerKey;

/// What a rule-applying operation does when the player has no record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// Fail with [`LedgerError::PlayerNotFound`](crate::game::LedgerError::PlayerNotFound).
    Reject,
    /// Start from a fresh record.
    Create,
}

/// Outcome of a successful referral redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralReceipt {
    /// Referee record after the bonus.
    pub record: PlayerRecord,
    pub settlement: ReferralSettlement,
}

pub trait PlayerRepository: Send + Sync {
    /// Load a record. Malformed stored JSON reads as a fresh record.
    fn get(&self, key: &PlayerKey) -> StorageResult<Option<PlayerRecord>>;

    /// Every readable record. Malformed entries are skipped.
    fn scan(&self) -> StorageResult<Vec<(PlayerKey, PlayerRecord)>>;

    /// Load a record, creating it (with a `player_created` event) if absent.
    ///
    /// Returns the record and whether it was created by this call.
    fn get_or_create(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
    ) -> StorageResult<(PlayerRecord, bool)>;

    /// Store `record` only if `key` has no record yet. Returns true on insert.
    fn insert_if_absent(
        &self,
        key: &PlayerKey,
        record: &PlayerRecord,
        event: LedgerEvent,
    ) -> StorageResult<bool>;

    /// Apply the daily claim atomically.
    fn claim(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
        on_missing: OnMissing,
    ) -> LedgerResult<PlayerRecord>;

    /// Redeem a referral code, crediting referee and referrer atomically.
    fn redeem_referral(
        &self,
        key: &PlayerKey,
        code: &str,
        now: DateTime<Utc>,
        on_missing: OnMissing,
    ) -> LedgerResult<ReferralReceipt>;

    /// Most recent ledger events of a player, newest first.
    fn events_for(&self, key: &PlayerKey, limit: usize) -> StorageResult<Vec<LedgerEvent>>;

    /// Verify the backend is readable and writable.
    fn health_check(&self) -> StorageResult<()>;
}
