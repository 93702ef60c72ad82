// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for wallet lookups.
//!
//! Caches the last `WalletInfo` per address so reconnects and repeated
//! status polls don't hit the Base RPC every time. Keys are lowercased.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::blockchain::WalletInfo;

/// Default number of addresses kept.
pub const DEFAULT_CAPACITY: usize = 1024;

struct CacheEntry {
    info: WalletInfo,
    inserted_at: Instant,
}

/// In-process LRU cache for wallet balance lookups.
pub struct WalletInfoCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl WalletInfoCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Cached info for an address. Returns `None` if not cached or expired.
    pub fn get(&self, address: &str) -> Option<WalletInfo> {
        let key = address.to_lowercase();
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.info.clone());
            }
            cache.pop(&key);
        }
        None
    }

    pub fn put(&self, info: WalletInfo) {
        let key = info.address.as_str().to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key,
                CacheEntry {
                    info,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Drop the entry for an address (disconnect, account switch).
    pub fn invalidate(&self, address: &str) {
        let key = address.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&key);
        }
    }
}
