// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Player Storage Module
//!
//! Persistent game state lives in an embedded redb database under the data
//! directory. Without a data directory the server falls back to an
//! in-memory store and nothing survives a restart.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   clenxi.redb        # players, referral code index, ledger events
//!   imports/
//!     *.json           # local-storage exports awaiting import
//!     *.imported       # processed exports
//! ```

pub mod audit;
pub mod error;
pub mod import;
pub mod memory;
pub mod paths;
pub mod player_database;
pub mod repository;
pub mod wallet_cache;

pub use audit::{LedgerEvent, LedgerEventType};
pub use error::{StorageError, StorageResult};
pub use import::{import_local_storage, import_pending_files, ImportReport};
pub use memory::MemoryPlayerStore;
pub use paths::StoragePaths;
pub use player_database::PlayerDatabase;
pub use repository::{OnMissing, PlayerRepository, ReferralReceipt};
pub use wallet_cache::WalletInfoCache;
