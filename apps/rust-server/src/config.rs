// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into an [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the player database and imports | unset (in-memory) |
//! | `PUBLIC_BASE_URL` | Public URL of the game, used in frames and links | derived per request |
//! | `VERCEL_URL` | Deployment host, used when `PUBLIC_BASE_URL` is unset | unset |
//! | `BASE_RPC_URL` | Base JSON-RPC endpoint for balance lookups | unset (no balances) |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate and key; both set enables HTTPS | unset |
//! | `WALLET_CACHE_TTL_SECS` | Wallet info cache lifetime | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// Holds `clenxi.redb` and the `imports/` drop folder. When unset the
/// server keeps players in memory only.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";
pub const VERCEL_URL_ENV: &str = "VERCEL_URL";
pub const BASE_RPC_URL_ENV: &str = "BASE_RPC_URL";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const WALLET_CACHE_TTL_ENV: &str = "WALLET_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WALLET_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("{0} must be set together with {1}")]
    IncompleteTls(&'static str, &'static str),
}

/// PEM certificate and key paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
    /// Fixed public base URL, without trailing slash.
    pub public_base_url: Option<String>,
    /// Deployment host name (no scheme).
    pub vercel_url: Option<String>,
    pub rpc_url: Option<String>,
    pub tls: Option<TlsPaths>,
    pub wallet_cache_ttl: Duration,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            data_dir: None,
            public_base_url: None,
            vercel_url: None,
            rpc_url: None,
            tls: None,
            wallet_cache_ttl: Duration::from_secs(DEFAULT_WALLET_CACHE_TTL_SECS),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = var(PORT_ENV)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(format!("{host}:{port}")))?;

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteTls(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV))
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteTls(TLS_KEY_PATH_ENV, TLS_CERT_PATH_ENV))
            }
        };

        let wallet_cache_ttl = Duration::from_secs(
            var(WALLET_CACHE_TTL_ENV)
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WALLET_CACHE_TTL_SECS),
        );

        Ok(Self {
            bind_addr,
            data_dir: var(DATA_DIR_ENV).map(PathBuf::from),
            public_base_url: var(PUBLIC_BASE_URL_ENV).map(|u| u.trim_end_matches('/').to_string()),
            vercel_url: var(VERCEL_URL_ENV),
            rpc_url: var(BASE_RPC_URL_ENV),
            tls,
            wallet_cache_ttl,
            json_logs: var(LOG_FORMAT_ENV).is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(config.data_dir.is_none());
        assert!(config.rpc_url.is_none());
        assert!(config.tls.is_none());
        assert_eq!(config.wallet_cache_ttl, Duration::from_secs(30));
        assert!(!config.json_logs);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("DATA_DIR", "/var/lib/clenxi"),
            ("PUBLIC_BASE_URL", "https://clenxi.example/"),
            ("BASE_RPC_URL", "https://mainnet.base.org"),
            ("LOG_FORMAT", "JSON"),
            ("WALLET_CACHE_TTL_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9090".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/clenxi")));
        assert_eq!(config.public_base_url.as_deref(), Some("https://clenxi.example"));
        assert_eq!(config.rpc_url.as_deref(), Some("https://mainnet.base.org"));
        assert_eq!(config.wallet_cache_ttl, Duration::from_secs(5));
        assert!(config.json_logs);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("DATA_DIR", "  "), ("PORT", "not-a-port")]).unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn tls_needs_both_paths() {
        let err = load(&[("TLS_CERT_PATH", "/etc/cert.pem")]).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteTls(_, _)));

        let config = load(&[
            ("TLS_CERT_PATH", "/etc/cert.pem"),
            ("TLS_KEY_PATH", "/etc/key.pem"),
        ])
        .unwrap();
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "/etc/cert.pem".into(),
                key: "/etc/key.pem".into(),
            })
        );
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = load(&[("HOST", "not a host")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddress(_)));
    }
}
