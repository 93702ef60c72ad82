// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded player database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `players`: player key → serialized PlayerRecord (JSON bytes)
//! - `referral_codes`: referral code → player key (first registered owner)
//! - `ledger_events`: composite key (player|!timestamp|event_id) → serialized LedgerEvent
//! - `meta`: key → value bytes (health check stamp)
//!
//! Claims and referral settlements run in a single write transaction, so
//! the referee credit, the referrer credit and their ledger events commit
//! together or not at all.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde_json::json;
use tracing::{debug, info, warn};

use super::repository::{OnMissing, PlayerRepository, ReferralReceipt};
use super::{LedgerEvent, LedgerEventType, StorageResult};
use crate::game::{
    normalize_code, LedgerError, LedgerResult, PlayerRecord, ReferralSettlement,
    DAILY_CLAIM_REWARD, REFERRAL_BONUS,
};
use crate::models::PlayerKey;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: player key → serialized PlayerRecord (JSON bytes).
const PLAYERS: TableDefinition<&str, &[u8]> = TableDefinition::new("players");

/// Index: referral code → player key.
const REFERRAL_CODES: TableDefinition<&str, &str> = TableDefinition::new("referral_codes");

/// Ledger: composite key → serialized LedgerEvent.
/// Key format: `player|!timestamp_be|event_id` for newest-first range scans.
const LEDGER_EVENTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("ledger_events");

/// Misc state.
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

// =============================================================================
// Key Helpers
// =============================================================================

/// Build a composite key for the ledger_events table.
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_event_key(player: &str, timestamp_ms: i64, event_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(player.len() + 1 + 8 + 1 + event_id.len());
    key.extend_from_slice(player.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!timestamp_ms as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(event_id.as_bytes());
    key
}

fn make_prefix(player: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(player.len() + 1);
    prefix.extend_from_slice(player.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Upper bound for a range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(player: &str) -> Vec<u8> {
    let mut end = make_prefix(player);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// Record Helpers
// =============================================================================

/// Decode a stored record, returning `None` for malformed JSON.
fn decode_record(key: &PlayerKey, bytes: &[u8]) -> Option<PlayerRecord> {
    match serde_json::from_slice::<PlayerRecord>(bytes) {
        Ok(mut record) => {
            record.ensure_referral_code(key);
            Some(record)
        }
        Err(e) => {
            warn!(player = %key, error = %e, "Skipping malformed player record");
            None
        }
    }
}

fn load(txn: &WriteTransaction, key: &PlayerKey) -> StorageResult<Option<PlayerRecord>> {
    let players = txn.open_table(PLAYERS)?;
    read_record(&players, key)
}

/// Load a record without the fresh-record fallback. Malformed JSON reads as `None`.
fn load_strict(txn: &WriteTransaction, key: &PlayerKey) -> StorageResult<Option<PlayerRecord>> {
    let players = txn.open_table(PLAYERS)?;
    let encoded = key.to_string();
    let record = players
        .get(encoded.as_str())?
        .and_then(|value| decode_record(key, value.value()));
    Ok(record)
}

fn read_record(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &PlayerKey,
) -> StorageResult<Option<PlayerRecord>> {
    let encoded = key.to_string();
    let bytes = match table.get(encoded.as_str())? {
        Some(value) => value.value().to_vec(),
        None => return Ok(None),
    };
    Ok(Some(
        decode_record(key, &bytes).unwrap_or_else(|| PlayerRecord::new_for(key)),
    ))
}

fn write_record(txn: &WriteTransaction, key: &PlayerKey, record: &PlayerRecord) -> StorageResult<()> {
    let json = serde_json::to_vec(record)?;
    let encoded = key.to_string();
    {
        let mut players = txn.open_table(PLAYERS)?;
        players.insert(encoded.as_str(), json.as_slice())?;
    }
    index_code(txn, &encoded, &record.referral_code)
}

/// Register `code` for `player` unless another player already owns it.
fn index_code(txn: &WriteTransaction, player: &str, code: &str) -> StorageResult<()> {
    if code.is_empty() {
        return Ok(());
    }

    let mut codes = txn.open_table(REFERRAL_CODES)?;
    let owner = codes.get(code)?.map(|value| value.value().to_string());
    match owner {
        None => {
            codes.insert(code, player)?;
        }
        Some(owner) if owner != player => {
            debug!(code, owner = %owner, player, "Referral code already registered to another player");
        }
        Some(_) => {}
    }
    Ok(())
}

fn lookup_code(txn: &WriteTransaction, code: &str) -> StorageResult<Option<PlayerKey>> {
    let codes = txn.open_table(REFERRAL_CODES)?;
    let owner = codes.get(code)?.map(|value| value.value().to_string());
    Ok(owner.and_then(|raw| match raw.parse::<PlayerKey>() {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(code, error = %e, "Referral index points at an unreadable player key");
            None
        }
    }))
}

fn append_event(txn: &WriteTransaction, event: &LedgerEvent) -> StorageResult<()> {
    let key = make_event_key(&event.player, event.timestamp.timestamp_millis(), &event.event_id);
    let json = serde_json::to_vec(event)?;
    let mut table = txn.open_table(LEDGER_EVENTS)?;
    table.insert(key.as_slice(), json.as_slice())?;
    Ok(())
}

// =============================================================================
// PlayerDatabase
// =============================================================================

/// Embedded ACID player database.
pub struct PlayerDatabase {
    db: Database,
}

impl PlayerDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PLAYERS)?;
            let _ = write_txn.open_table(REFERRAL_CODES)?;
            let _ = write_txn.open_table(LEDGER_EVENTS)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        info!(path = %path.display(), "Player database opened");
        Ok(Self { db })
    }

    fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Load the record for a rule-applying operation.
    ///
    /// Returns the record and whether it is new.
    fn load_for_update(
        txn: &WriteTransaction,
        key: &PlayerKey,
        on_missing: OnMissing,
    ) -> LedgerResult<(PlayerRecord, bool)> {
        match load(txn, key)? {
            Some(record) => Ok((record, false)),
            None if on_missing == OnMissing::Create => Ok((PlayerRecord::new_for(key), true)),
            None => Err(LedgerError::PlayerNotFound(key.to_string())),
        }
    }

    /// Write raw bytes under a player key, bypassing serialization.
    #[cfg(test)]
    fn put_raw(&self, key: &str, bytes: &[u8]) {
        let txn = self.db.begin_write().unwrap();
        {
            let mut players = txn.open_table(PLAYERS).unwrap();
            players.insert(key, bytes).unwrap();
        }
        txn.commit().unwrap();
    }

    /// Owner registered for a referral code.
    #[cfg(test)]
    fn code_owner(&self, code: &str) -> Option<PlayerKey> {
        let txn = self.db.begin_write().unwrap();
        let owner = lookup_code(&txn, code).unwrap();
        txn.abort().unwrap();
        owner
    }
}

impl PlayerRepository for PlayerDatabase {
    fn get(&self, key: &PlayerKey) -> StorageResult<Option<PlayerRecord>> {
        let read_txn = self.db.begin_read()?;
        let players = read_txn.open_table(PLAYERS)?;
        read_record(&players, key)
    }

    fn scan(&self) -> StorageResult<Vec<(PlayerKey, PlayerRecord)>> {
        let read_txn = self.db.begin_read()?;
        let players = read_txn.open_table(PLAYERS)?;

        let mut records = Vec::new();
        for entry in players.iter()? {
            let (raw_key, value) = entry?;
            let key = match raw_key.value().parse::<PlayerKey>() {
                Ok(key) => key,
                Err(e) => {
                    warn!(key = raw_key.value(), error = %e, "Skipping unreadable player key");
                    continue;
                }
            };
            if let Some(record) = decode_record(&key, value.value()) {
                records.push((key, record));
            }
        }
        Ok(records)
    }

    fn get_or_create(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
    ) -> StorageResult<(PlayerRecord, bool)> {
        let txn = self.begin_write()?;
        if let Some(record) = load(&txn, key)? {
            txn.abort()?;
            return Ok((record, false));
        }

        let record = PlayerRecord::new_for(key);
        write_record(&txn, key, &record)?;
        append_event(&txn, &LedgerEvent::new(LedgerEventType::PlayerCreated, key, now))?;
        txn.commit()?;

        info!(player = %key, referral_code = %record.referral_code, "Player created");
        Ok((record, true))
    }

    fn insert_if_absent(
        &self,
        key: &PlayerKey,
        record: &PlayerRecord,
        event: LedgerEvent,
    ) -> StorageResult<bool> {
        let txn = self.begin_write()?;
        if load(&txn, key)?.is_some() {
            txn.abort()?;
            return Ok(false);
        }

        write_record(&txn, key, record)?;
        append_event(&txn, &event)?;
        txn.commit()?;
        Ok(true)
    }

    fn claim(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
        on_missing: OnMissing,
    ) -> LedgerResult<PlayerRecord> {
        let txn = self.begin_write()?;
        let (mut record, created) = Self::load_for_update(&txn, key, on_missing)?;

        record.apply_claim(now)?;

        write_record(&txn, key, &record)?;
        if created {
            append_event(&txn, &LedgerEvent::created_before(key, now))?;
        }
        append_event(
            &txn,
            &LedgerEvent::new(LedgerEventType::DailyClaim, key, now).with_amount(DAILY_CLAIM_REWARD),
        )?;
        txn.commit().map_err(super::StorageError::from)?;

        info!(player = %key, balance = record.balance, "Daily claim granted");
        Ok(record)
    }

    fn redeem_referral(
        &self,
        key: &PlayerKey,
        code: &str,
        now: DateTime<Utc>,
        on_missing: OnMissing,
    ) -> LedgerResult<ReferralReceipt> {
        let code = normalize_code(code)?;
        let txn = self.begin_write()?;
        let (mut record, created) = Self::load_for_update(&txn, key, on_missing)?;

        record.apply_referral_bonus(&code)?;

        let referrer = lookup_code(&txn, &code)?.filter(|owner| owner != key);
        let mut referrer_credited = false;
        if let Some(owner) = &referrer {
            match load_strict(&txn, owner)? {
                Some(mut referrer_record) => {
                    referrer_record.credit_referrer();
                    write_record(&txn, owner, &referrer_record)?;
                    append_event(
                        &txn,
                        &LedgerEvent::new(LedgerEventType::ReferrerCredit, owner, now)
                            .with_amount(REFERRAL_BONUS)
                            .with_details(json!({ "referee": key.to_string(), "code": code })),
                    )?;
                    referrer_credited = true;
                }
                None => {
                    warn!(code = %code, owner = %owner, "Referrer record is missing or malformed; not credited");
                }
            }
        }

        write_record(&txn, key, &record)?;
        if created {
            append_event(&txn, &LedgerEvent::created_before(key, now))?;
        }
        append_event(
            &txn,
            &LedgerEvent::new(LedgerEventType::ReferralBonus, key, now)
                .with_amount(REFERRAL_BONUS)
                .with_details(json!({ "code": code, "referrerCredited": referrer_credited })),
        )?;
        txn.commit().map_err(super::StorageError::from)?;

        if referrer_credited {
            info!(player = %key, code = %code, "Referral settled for both players");
        } else {
            warn!(player = %key, code = %code, "Referral code has no owner; only the referee was credited");
        }

        Ok(ReferralReceipt {
            record,
            settlement: ReferralSettlement {
                code,
                bonus: REFERRAL_BONUS,
                referrer: referrer.filter(|_| referrer_credited).map(|k| k.to_string()),
                referrer_credited,
            },
        })
    }

    fn events_for(&self, key: &PlayerKey, limit: usize) -> StorageResult<Vec<LedgerEvent>> {
        let player = key.to_string();
        let prefix = make_prefix(&player);
        let prefix_end = make_prefix_end(&player);

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_EVENTS)?;

        let mut events = Vec::with_capacity(limit.min(64));
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let (_, value) = entry?;
            match serde_json::from_slice::<LedgerEvent>(value.value()) {
                Ok(event) => events.push(event),
                Err(e) => warn!(player = %player, error = %e, "Skipping malformed ledger event"),
            }
            if events.len() >= limit {
                break;
            }
        }
        Ok(events)
    }

    fn health_check(&self) -> StorageResult<()> {
        let stamp = Utc::now().timestamp_millis().to_be_bytes();
        let txn = self.begin_write()?;
        {
            let mut meta = txn.open_table(META)?;
            meta.insert("last_health_check", stamp.as_slice())?;
        }
        txn.commit()?;

        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(PLAYERS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
