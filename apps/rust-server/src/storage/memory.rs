// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory player store.
//!
//! Used when no data directory is configured and by handler tests. Nothing
//! survives a restart. A single mutex guards players, the referral code index
//! and the ledger, so every operation is atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::repository::{OnMissing, PlayerRepository, ReferralReceipt};
use super::{LedgerEvent, LedgerEventType, StorageError, StorageResult};
use crate::game::{
    normalize_code, LedgerError, LedgerResult, PlayerRecord, ReferralSettlement,
    DAILY_CLAIM_REWARD, REFERRAL_BONUS,
};
use crate::models::PlayerKey;

#[derive(Default)]
struct Inner {
    players: HashMap<PlayerKey, PlayerRecord>,
    codes: HashMap<String, PlayerKey>,
    events: Vec<LedgerEvent>,
}

impl Inner {
    fn write(&mut self, key: &PlayerKey, record: PlayerRecord) {
        if !record.referral_code.is_empty() {
            self.codes
                .entry(record.referral_code.clone())
                .or_insert_with(|| key.clone());
        }
        self.players.insert(key.clone(), record);
    }

    fn load_for_update(
        &self,
        key: &PlayerKey,
        on_missing: OnMissing,
    ) -> LedgerResult<(PlayerRecord, bool)> {
        match self.players.get(key) {
            Some(record) => Ok((record.clone(), false)),
            None if on_missing == OnMissing::Create => Ok((PlayerRecord::new_for(key), true)),
            None => Err(LedgerError::PlayerNotFound(key.to_string())),
        }
    }
}

#[derive(Default)]
pub struct MemoryPlayerStore {
    inner: Mutex<Inner>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned)
    }

    #[cfg(test)]
    fn code_owner(&self, code: &str) -> Option<PlayerKey> {
        self.lock().unwrap().codes.get(code).cloned()
    }
}

impl PlayerRepository for MemoryPlayerStore {
    fn get(&self, key: &PlayerKey) -> StorageResult<Option<PlayerRecord>> {
        Ok(self.lock()?.players.get(key).cloned())
    }

    fn scan(&self) -> StorageResult<Vec<(PlayerKey, PlayerRecord)>> {
        Ok(self
            .lock()?
            .players
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    fn get_or_create(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
    ) -> StorageResult<(PlayerRecord, bool)> {
        let mut inner = self.lock()?;
        if let Some(record) = inner.players.get(key) {
            return Ok((record.clone(), false));
        }

        let record = PlayerRecord::new_for(key);
        inner.write(key, record.clone());
        inner
            .events
            .push(LedgerEvent::new(LedgerEventType::PlayerCreated, key, now));

        info!(player = %key, referral_code = %record.referral_code, "Player created");
        Ok((record, true))
    }

    fn insert_if_absent(
        &self,
        key: &PlayerKey,
        record: &PlayerRecord,
        event: LedgerEvent,
    ) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        if inner.players.contains_key(key) {
            return Ok(false);
        }
        inner.write(key, record.clone());
        inner.events.push(event);
        Ok(true)
    }

    fn claim(
        &self,
        key: &PlayerKey,
        now: DateTime<Utc>,
        on_missing: OnMissing,
    ) -> LedgerResult<PlayerRecord> {
        let mut inner = self.lock()?;
        let (mut record, created) = inner.load_for_update(key, on_missing)?;

        record.apply_claim(now)?;

        inner.write(key, record.clone());
        if created {
            inner.events.push(LedgerEvent::created_before(key, now));
        }
        inner.events.push(
            LedgerEvent::new(LedgerEventType::DailyClaim, key, now).with_amount(DAILY_CLAIM_REWARD),
        );

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
        let mut inner = self.lock()?;
        let (mut record, created) = inner.load_for_update(key, on_missing)?;

        record.apply_referral_bonus(&code)?;

        let referrer = inner.codes.get(&code).filter(|owner| *owner != key).cloned();
        let mut referrer_credited = false;
        if let Some(owner) = &referrer {
            match inner.players.get(owner).cloned() {
                Some(mut referrer_record) => {
                    referrer_record.credit_referrer();
                    inner.write(owner, referrer_record);
                    inner.events.push(
                        LedgerEvent::new(LedgerEventType::ReferrerCredit, owner, now)
                            .with_amount(REFERRAL_BONUS)
                            .with_details(json!({ "referee": key.to_string(), "code": code })),
                    );
                    referrer_credited = true;
                }
                None => warn!(code = %code, owner = %owner, "Referral index points at a missing player"),
            }
        }

        inner.write(key, record.clone());
        if created {
            inner.events.push(LedgerEvent::created_before(key, now));
        }
        inner.events.push(
            LedgerEvent::new(LedgerEventType::ReferralBonus, key, now)
                .with_amount(REFERRAL_BONUS)
                .with_details(json!({ "code": code, "referrerCredited": referrer_credited })),
        );

        if !referrer_credited {
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
        let inner = self.lock()?;
        let mut events: Vec<LedgerEvent> = inner
            .events
            .iter()
            .filter(|event| event.player == player)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse it too.
        events.reverse();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        Ok(events)
    }

    fn health_check(&self) -> StorageResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ReferralError;
    use crate::models::WalletAddress;
    use chrono::Duration;

    fn wallet(hex: &str) -> PlayerKey {
        PlayerKey::Wallet(WalletAddress::parse(hex).unwrap())
    }

    #[test]
    fn claim_and_referral_flow() {
        let store = MemoryPlayerStore::new();
        let now = Utc::now();
        let referrer = wallet("0xabc0000000000000000000000000000000000123");
        let referee = PlayerKey::Fid(42);

        store.get_or_create(&referrer, now).unwrap();

        let record = store.claim(&referee, now, OnMissing::Create).unwrap();
        assert_eq!(record.balance, 1000);
        assert_eq!(record.referral_code, "FC42");

        let receipt = store
            .redeem_referral(&referee, "abc123", now, OnMissing::Reject)
            .unwrap();
        assert!(receipt.settlement.referrer_credited);
        assert_eq!(receipt.record.balance, 6000);

        let referrer_record = store.get(&referrer).unwrap().unwrap();
        assert_eq!(referrer_record.balance, 5000);
        assert_eq!(referrer_record.referral_count, 1);

        let err = store
            .redeem_referral(&referee, "abc123", now, OnMissing::Reject)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Referral(ReferralError::AlreadyUsed)));
    }

    #[test]
    fn reject_mode_requires_existing_player() {
        let store = MemoryPlayerStore::new();
        let err = store
            .claim(&PlayerKey::Guest, Utc::now(), OnMissing::Reject)
            .unwrap_err();
        assert!(matches!(err, LedgerError::PlayerNotFound(_)));
        assert!(store.scan().unwrap().is_empty());
    }

    #[test]
    fn insert_if_absent_keeps_existing() {
        let store = MemoryPlayerStore::new();
        let key = PlayerKey::Fid(1);
        let now = Utc::now();

        let mut imported = PlayerRecord::new_for(&key);
        imported.balance = 9000;
        let event = LedgerEvent::new(LedgerEventType::LegacyImport, &key, now);

        assert!(store.insert_if_absent(&key, &imported, event.clone()).unwrap());
        assert!(!store.insert_if_absent(&key, &PlayerRecord::new_for(&key), event).unwrap());
        assert_eq!(store.get(&key).unwrap().unwrap().balance, 9000);
        assert_eq!(store.code_owner("FC1"), Some(key));
    }

    #[test]
    fn events_newest_first() {
        let store = MemoryPlayerStore::new();
        let key = PlayerKey::Fid(3);
        let t0 = Utc::now();

        store.claim(&key, t0, OnMissing::Create).unwrap();
        store
            .claim(&key, t0 + Duration::days(1), OnMissing::Create)
            .unwrap();

        let events = store.events_for(&key, 10).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp, t0 + Duration::days(1));
        assert_eq!(events[2].event_type, LedgerEventType::PlayerCreated);
    }
}
