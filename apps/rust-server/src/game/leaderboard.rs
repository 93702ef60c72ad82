// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Leaderboard ranking over wallet players.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::PlayerRecord;
use crate::models::WalletAddress;

/// One ranked row.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[schema(value_type = String)]
    pub address: WalletAddress,
    /// Truncated address for display, e.g. `0x742d...ab12`.
    pub display_address: String,
    pub balance: u64,
    pub total_earned: u64,
    pub referral_count: u64,
    /// Last claim time, used as the player's last activity.
    pub last_active: Option<DateTime<Utc>>,
    pub is_current_user: bool,
}

/// Ranked standings.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    /// Top entries, best first.
    pub entries: Vec<LeaderboardEntry>,
    /// Number of players with a non-zero balance or earnings.
    pub total_players: usize,
    /// The current user's position when it is not among `entries`.
    pub current_user: Option<LeaderboardEntry>,
}

fn entry(
    rank: usize,
    address: &WalletAddress,
    record: &PlayerRecord,
    is_current_user: bool,
) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        address: address.clone(),
        display_address: address.truncated(),
        balance: record.balance,
        total_earned: record.total_earned,
        referral_count: record.referral_count,
        last_active: record.last_claim,
        is_current_user,
    }
}

fn by_balance(players: &mut [(WalletAddress, PlayerRecord)]) {
    players.sort_by(|(addr_a, a), (addr_b, b)| {
        b.balance.cmp(&a.balance).then_with(|| addr_a.cmp(addr_b))
    });
}

/// Rank wallet players by balance, highest first.
///
/// Only players that have earned something are listed and counted. The
/// current user's fallback rank is computed over every wallet player,
/// including those still at zero.
pub fn rank_players(
    mut players: Vec<(WalletAddress, PlayerRecord)>,
    current: Option<&WalletAddress>,
    limit: usize,
) -> Standings {
    by_balance(&mut players);

    let active: Vec<&(WalletAddress, PlayerRecord)> = players
        .iter()
        .filter(|(_, record)| record.balance > 0 || record.total_earned > 0)
        .collect();

    let entries: Vec<LeaderboardEntry> = active
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, (address, record))| entry(i + 1, address, record, current == Some(address)))
        .collect();

    let current_in_top = entries.iter().any(|e| e.is_current_user);
    let current_user = match current {
        Some(current) if !current_in_top => players
            .iter()
            .position(|(address, _)| address == current)
            .map(|pos| entry(pos + 1, current, &players[pos].1, true)),
        _ => None,
    };

    Standings {
        total_players: active.len(),
        entries,
        current_user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{:040x}", last)).unwrap()
    }

    fn record(balance: u64, referrals: u64) -> PlayerRecord {
        PlayerRecord {
            balance,
            total_earned: balance,
            referral_count: referrals,
            ..PlayerRecord::default()
        }
    }

    #[test]
    fn ranks_by_balance_and_skips_empty_players() {
        let players = vec![
            (addr(1), record(1000, 0)),
            (addr(2), record(0, 0)),
            (addr(3), record(7000, 1)),
            (addr(4), record(6000, 0)),
        ];

        let standings = rank_players(players, None, 10);

        assert_eq!(standings.total_players, 3);
        let order: Vec<_> = standings.entries.iter().map(|e| e.address.clone()).collect();
        assert_eq!(order, vec![addr(3), addr(4), addr(1)]);
        assert_eq!(standings.entries[0].rank, 1);
        assert_eq!(standings.entries[2].rank, 3);
        assert!(standings.current_user.is_none());
    }

    #[test]
    fn ties_are_broken_by_address() {
        let players = vec![(addr(9), record(1000, 0)), (addr(5), record(1000, 0))];
        let standings = rank_players(players, None, 10);
        assert_eq!(standings.entries[0].address, addr(5));
    }

    #[test]
    fn current_user_in_top_is_flagged() {
        let players = vec![(addr(1), record(1000, 0)), (addr(2), record(2000, 0))];
        let standings = rank_players(players, Some(&addr(1)), 10);

        assert!(standings.entries[1].is_current_user);
        assert!(!standings.entries[0].is_current_user);
        assert!(standings.current_user.is_none());
    }

    #[test]
    fn current_user_outside_top_gets_own_rank() {
        let players: Vec<_> = (1..=12u8)
            .map(|i| (addr(i), record(u64::from(i) * 1000, 0)))
            .chain(std::iter::once((addr(99), record(0, 0))))
            .collect();

        let standings = rank_players(players, Some(&addr(99)), 10);

        assert_eq!(standings.entries.len(), 10);
        assert_eq!(standings.total_players, 12);
        let me = standings.current_user.expect("current user rank");
        assert_eq!(me.rank, 13);
        assert!(me.is_current_user);
        assert_eq!(me.balance, 0);
    }
}
