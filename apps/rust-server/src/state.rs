// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use crate::blockchain::BaseClient;
use crate::config::AppConfig;
use crate::storage::{wallet_cache, MemoryPlayerStore, PlayerRepository, WalletInfoCache};

#[derive(Clone)]
pub struct AppState {
    pub players: Arc<dyn PlayerRepository>,
    /// Base RPC client. `None` when no endpoint is configured.
    pub chain: Option<Arc<BaseClient>>,
    pub wallet_cache: Arc<WalletInfoCache>,
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(players: Arc<dyn PlayerRepository>, config: AppConfig) -> Self {
        Self {
            players,
            chain: None,
            wallet_cache: Arc::new(WalletInfoCache::new(
                wallet_cache::DEFAULT_CAPACITY,
                config.wallet_cache_ttl,
            )),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn with_chain(mut self, client: BaseClient) -> Self {
        self.chain = Some(Arc::new(client));
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryPlayerStore::new()), AppConfig::default())
    }
}
