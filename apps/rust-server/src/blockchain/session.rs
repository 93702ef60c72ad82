// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provider event handling.
//!
//! Browser wallets emit `accountsChanged` and `chainChanged`. The client
//! forwards them here and gets back what the session should do next.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{parse_chain_id, AddChainParams, BASE_MAINNET};
use crate::models::WalletAddress;

/// Event forwarded from the wallet provider.
#[derive(Debug, Clone, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum WalletEvent {
    /// Accounts exposed by the wallet, first is active.
    AccountsChanged { accounts: Vec<String> },
    /// Hex chain id the wallet switched to.
    #[serde(rename_all = "camelCase")]
    ChainChanged { chain_id: String },
}

/// What the session should do after an event.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SessionAction {
    /// Forget the connected wallet.
    Disconnect,
    /// Connect (again) with this address.
    Reconnect { address: WalletAddress },
    /// Ask the wallet to switch to Base, adding it first if unknown.
    #[serde(rename_all = "camelCase")]
    SwitchNetwork {
        message: String,
        switch_params: SwitchChainParams,
        add_params: AddChainParams,
    },
    /// Nothing to do.
    None,
}

/// `wallet_switchEthereumChain` parameters.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

/// Errors resolving a wallet event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid account address: {0}")]
    InvalidAccount(String),

    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),
}

/// Action prompting the wallet back onto Base.
pub fn switch_to_base() -> SessionAction {
    let add_params = BASE_MAINNET.add_chain_params();
    SessionAction::SwitchNetwork {
        message: format!("Please switch to {} network to continue", BASE_MAINNET.name),
        switch_params: SwitchChainParams {
            chain_id: add_params.chain_id.clone(),
        },
        add_params,
    }
}

/// Decide the session action for a wallet event.
pub fn resolve_event(
    event: &WalletEvent,
    current: Option<&WalletAddress>,
) -> Result<SessionAction, SessionError> {
    match event {
        WalletEvent::AccountsChanged { accounts } => {
            let Some(first) = accounts.first() else {
                return Ok(SessionAction::Disconnect);
            };
            let address = WalletAddress::parse(first)
                .map_err(|_| SessionError::InvalidAccount(first.clone()))?;

            match current {
                Some(current) if *current != address => Ok(SessionAction::Reconnect { address }),
                _ => Ok(SessionAction::None),
            }
        }
        WalletEvent::ChainChanged { chain_id } => {
            let chain_id = parse_chain_id(chain_id)
                .ok_or_else(|| SessionError::InvalidChainId(chain_id.clone()))?;

            if chain_id != BASE_MAINNET.chain_id {
                return Ok(switch_to_base());
            }
            Ok(match current {
                Some(current) => SessionAction::Reconnect {
                    address: current.clone(),
                },
                None => SessionAction::None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    fn addr(raw: &str) -> WalletAddress {
        WalletAddress::parse(raw).unwrap()
    }

    fn accounts(list: &[&str]) -> WalletEvent {
        WalletEvent::AccountsChanged {
            accounts: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_accounts_disconnect() {
        let action = resolve_event(&accounts(&[]), Some(&addr(A))).unwrap();
        assert_eq!(action, SessionAction::Disconnect);
    }

    #[test]
    fn switched_account_reconnects() {
        let action = resolve_event(&accounts(&[B, A]), Some(&addr(A))).unwrap();
        assert_eq!(action, SessionAction::Reconnect { address: addr(B) });

        // Same account in different case is not a switch
        let upper = A.to_uppercase().replace("0X", "0x");
        let same = resolve_event(&accounts(&[upper.as_str()]), Some(&addr(A))).unwrap();
        assert_eq!(same, SessionAction::None);

        let disconnected = resolve_event(&accounts(&[B]), None).unwrap();
        assert_eq!(disconnected, SessionAction::None);
    }

    #[test]
    fn invalid_account_is_an_error() {
        let err = resolve_event(&accounts(&["nope"]), None).unwrap_err();
        assert_eq!(err, SessionError::InvalidAccount("nope".into()));
    }

    #[test]
    fn foreign_chain_asks_to_switch() {
        let event = WalletEvent::ChainChanged {
            chain_id: "0x1".into(),
        };
        match resolve_event(&event, Some(&addr(A))).unwrap() {
            SessionAction::SwitchNetwork {
                switch_params,
                add_params,
                ..
            } => {
                assert_eq!(switch_params.chain_id, "0x2105");
                assert_eq!(add_params.chain_name, "Base");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn base_chain_resyncs_connected_wallet() {
        let event = WalletEvent::ChainChanged {
            chain_id: "0x2105".into(),
        };
        assert_eq!(
            resolve_event(&event, Some(&addr(A))).unwrap(),
            SessionAction::Reconnect { address: addr(A) }
        );
        assert_eq!(resolve_event(&event, None).unwrap(), SessionAction::None);
    }

    #[test]
    fn events_deserialize_from_provider_shape() {
        let event: WalletEvent =
            serde_json::from_str(r#"{"event":"chainChanged","chainId":"0x2105"}"#).unwrap();
        assert_eq!(
            event,
            WalletEvent::ChainChanged {
                chain_id: "0x2105".into()
            }
        );

        let event: WalletEvent =
            serde_json::from_str(r#"{"event":"accountsChanged","accounts":[]}"#).unwrap();
        assert_eq!(event, WalletEvent::AccountsChanged { accounts: vec![] });
    }

    #[test]
    fn actions_serialize_with_tag() {
        let json = serde_json::to_value(SessionAction::Disconnect).unwrap();
        assert_eq!(json["action"], "disconnect");
        let json = serde_json::to_value(switch_to_base()).unwrap();
        assert_eq!(json["action"], "switchNetwork");
        assert_eq!(json["switchParams"]["chainId"], "0x2105");
    }
}
