// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Import of player records exported from browser local storage.
//!
//! The browser build of the game kept one JSON document per player under
//! `clenxi-game-data-0x…`, `clenxi-game-data-fid-<n>` or `clenxi-game-data`
//! (guest). An export is a flat map of those keys to their raw values.
//! Existing records always win over imported ones.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::repository::PlayerRepository;
use super::{LedgerEvent, LedgerEventType, StorageResult};
use crate::game::PlayerRecord;
use crate::models::{PlayerKey, WalletAddress};

/// Local-storage key prefix used by the browser build.
pub const LEGACY_KEY_PREFIX: &str = "clenxi-game-data";

/// Extension given to import files once processed.
const IMPORTED_SUFFIX: &str = "imported";

/// Counts from one import run.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub already_present: usize,
    pub malformed: usize,
    pub foreign: usize,
}

impl ImportReport {
    fn merge(&mut self, other: ImportReport) {
        self.imported += other.imported;
        self.already_present += other.already_present;
        self.malformed += other.malformed;
        self.foreign += other.foreign;
    }
}

/// Map a local-storage key to the player it belonged to.
pub fn legacy_key_to_player(storage_key: &str) -> Option<PlayerKey> {
    let rest = storage_key.strip_prefix(LEGACY_KEY_PREFIX)?;
    if rest.is_empty() {
        return Some(PlayerKey::Guest);
    }

    let rest = rest.strip_prefix('-')?;
    if let Some(fid) = rest.strip_prefix("fid-") {
        return fid.parse().ok().map(PlayerKey::Fid);
    }
    WalletAddress::parse(rest).ok().map(PlayerKey::Wallet)
}

/// Local storage holds strings, but hand-made exports often inline the object.
fn decode_legacy_value(value: Value) -> Result<PlayerRecord, serde_json::Error> {
    match value {
        Value::String(raw) => serde_json::from_str(&raw),
        other => serde_json::from_value(other),
    }
}

/// Import a local-storage export.
pub fn import_local_storage(
    repo: &dyn PlayerRepository,
    entries: BTreeMap<String, Value>,
    now: DateTime<Utc>,
) -> StorageResult<ImportReport> {
    let mut report = ImportReport::default();

    for (storage_key, value) in entries {
        let Some(player) = legacy_key_to_player(&storage_key) else {
            report.foreign += 1;
            continue;
        };

        let mut record = match decode_legacy_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Skipping malformed legacy record");
                report.malformed += 1;
                continue;
            }
        };
        record.ensure_referral_code(&player);

        let event = LedgerEvent::new(LedgerEventType::LegacyImport, &player, now)
            .with_amount(record.balance)
            .with_details(json!({ "sourceKey": storage_key }));

        if repo.insert_if_absent(&player, &record, event)? {
            report.imported += 1;
        } else {
            report.already_present += 1;
        }
    }

    info!(
        imported = report.imported,
        already_present = report.already_present,
        malformed = report.malformed,
        foreign = report.foreign,
        "Legacy import finished"
    );
    Ok(report)
}

/// Import every `*.json` export waiting in `dir`, renaming each processed
/// file to `*.imported`. Unreadable files are left in place.
pub fn import_pending_files(
    repo: &dyn PlayerRepository,
    dir: &Path,
    now: DateTime<Utc>,
) -> StorageResult<ImportReport> {
    let mut total = ImportReport::default();
    if !dir.exists() {
        return Ok(total);
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let contents = std::fs::read_to_string(&path)?;
        let entries: BTreeMap<String, Value> = match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Import file is not a JSON object; leaving it in place");
                continue;
            }
        };

        total.merge(import_local_storage(repo, entries, now)?);
        std::fs::rename(&path, path.with_extension(IMPORTED_SUFFIX))?;
        info!(path = %path.display(), "Import file processed");
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPlayerStore;

    const WALLET: &str = "0xabc0000000000000000000000000000000000123";

    #[test]
    fn legacy_keys_map_to_players() {
        assert_eq!(legacy_key_to_player("clenxi-game-data"), Some(PlayerKey::Guest));
        assert_eq!(
            legacy_key_to_player("clenxi-game-data-fid-99"),
            Some(PlayerKey::Fid(99))
        );
        assert_eq!(
            legacy_key_to_player(&format!("clenxi-game-data-{WALLET}")),
            Some(PlayerKey::Wallet(WalletAddress::parse(WALLET).unwrap()))
        );
        assert_eq!(legacy_key_to_player("clenxi-game-data-fid-abc"), None);
        assert_eq!(legacy_key_to_player("clenxi-game-dataX"), None);
        assert_eq!(legacy_key_to_player("theme"), None);
    }

    #[test]
    fn import_counts_each_outcome() {
        let store = MemoryPlayerStore::new();
        let existing = PlayerKey::Fid(1);
        store.get_or_create(&existing, Utc::now()).unwrap();

        let mut entries = BTreeMap::new();
        entries.insert(
            format!("clenxi-game-data-{WALLET}"),
            Value::String(r#"{"balance":6000,"lastClaim":"2025-03-01T10:00:00.000Z","totalEarned":6000,"referralCode":"","hasUsedReferral":true}"#.into()),
        );
        entries.insert(
            "clenxi-game-data-fid-1".into(),
            json!({ "balance": 42 }),
        );
        entries.insert("clenxi-game-data".into(), Value::String("{broken".into()));
        entries.insert("wagmi.store".into(), json!({}));

        let report = import_local_storage(&store, entries, Utc::now()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 1,
                already_present: 1,
                malformed: 1,
                foreign: 1,
            }
        );

        let wallet_key = PlayerKey::Wallet(WalletAddress::parse(WALLET).unwrap());
        let imported = store.get(&wallet_key).unwrap().unwrap();
        assert_eq!(imported.balance, 6000);
        assert_eq!(imported.referral_code, "ABC123");
        assert!(imported.has_used_referral);

        // Not overwritten
        assert_eq!(store.get(&existing).unwrap().unwrap().balance, 0);

        let events = store.events_for(&wallet_key, 10).unwrap();
        assert_eq!(events[0].event_type, LedgerEventType::LegacyImport);
        assert_eq!(events[0].amount, 6000);
    }

    #[test]
    fn pending_files_are_imported_once() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("export.json");
        std::fs::write(&export, r#"{"clenxi-game-data-fid-5":"{\"balance\":1000}"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = MemoryPlayerStore::new();
        let report = import_pending_files(&store, dir.path(), Utc::now()).unwrap();
        assert_eq!(report.imported, 1);
        assert!(!export.exists());
        assert!(dir.path().join("export.imported").exists());

        let again = import_pending_files(&store, dir.path(), Utc::now()).unwrap();
        assert_eq!(again, ImportReport::default());
    }

    #[test]
    fn missing_directory_is_empty_report() {
        let store = MemoryPlayerStore::new();
        let report =
            import_pending_files(&store, Path::new("/nonexistent/imports"), Utc::now()).unwrap();
        assert_eq!(report, ImportReport::default());
    }
}
