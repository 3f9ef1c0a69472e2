// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the validated [`AppConfig`]
//! loaded once at startup. A `.env` file is honoured when present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the wallet database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS when both are set | unset |
//! | `NETWORK` | `mainnet` or `sepolia` | `sepolia` |
//! | `RPC_URL` | JSON-RPC endpoint override | network preset |
//! | `WALLET_CIPHER` | Private key cipher (`aes-256-gcm` or `fernet`) | `aes-256-gcm` |
//! | `WALLET_CIPHER_KEY` | Base64 32-byte cipher key (standard or url-safe) | Required |
//! | `WALLET_MAX_SECRET_LEN` | Maximum ciphertext length | `250` |
//! | `TX_MAX_FEE_PER_GAS` | Max fee per gas (wei) | `30000000000` |
//! | `TX_MAX_PRIORITY_FEE_PER_GAS` | Max priority fee per gas (wei) | `1500000000` |
//! | `TX_TYPE` | Transaction envelope type | `2` |
//! | `TX_CHAIN_ID` | Chain id | network preset |
//! | `TX_GAS_LIMIT` | Gas limit | `21000` |
//! | `TX_SWEEP_POLICY` | `full-balance` or `balance-minus-fee` | `full-balance` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::blockchain::NetworkConfig;
use crate::storage::{CipherKey, CipherKind, StoragePaths, DEFAULT_MAX_SECRET_LEN};
use crate::transfer::{SweepPolicy, TransferSettings};

/// Environment variable name for the data directory path.
///
/// # Default
/// `/data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// PEM certificate chain. HTTPS is served only when both TLS paths are set.
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
/// PEM private key for the certificate.
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const NETWORK_ENV: &str = "NETWORK";
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Cipher registry name for private keys at rest.
pub const WALLET_CIPHER_ENV: &str = "WALLET_CIPHER";
/// Base64-encoded 32-byte key for the wallet cipher.
///
/// Never logged. Losing it makes every stored key unreadable.
pub const WALLET_CIPHER_KEY_ENV: &str = "WALLET_CIPHER_KEY";
pub const WALLET_MAX_SECRET_LEN_ENV: &str = "WALLET_MAX_SECRET_LEN";

pub const TX_MAX_FEE_PER_GAS_ENV: &str = "TX_MAX_FEE_PER_GAS";
pub const TX_MAX_PRIORITY_FEE_PER_GAS_ENV: &str = "TX_MAX_PRIORITY_FEE_PER_GAS";
pub const TX_TYPE_ENV: &str = "TX_TYPE";
pub const TX_CHAIN_ID_ENV: &str = "TX_CHAIN_ID";
pub const TX_GAS_LIMIT_ENV: &str = "TX_GAS_LIMIT";
pub const TX_SWEEP_POLICY_ENV: &str = "TX_SWEEP_POLICY";

/// Logging format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything other than `json` means pretty.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub storage: StoragePaths,
    pub network: NetworkConfig,
    pub cipher: CipherKind,
    pub cipher_key: CipherKey,
    pub max_secret_len: usize,
    pub transfer: TransferSettings,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let storage = match get(DATA_DIR_ENV) {
            Some(dir) => StoragePaths::new(dir),
            None => StoragePaths::default(),
        };

        let mut network = match get(NETWORK_ENV) {
            Some(name) => {
                NetworkConfig::from_name(&name).map_err(|e| ConfigError::invalid(NETWORK_ENV, e))?
            }
            None => NetworkConfig::sepolia(),
        };
        if let Some(rpc_url) = get(RPC_URL_ENV) {
            network = network.with_rpc_url(rpc_url);
        }

        let cipher = match get(WALLET_CIPHER_ENV) {
            Some(name) => {
                CipherKind::from_str(&name).map_err(|e| ConfigError::invalid(WALLET_CIPHER_ENV, e))?
            }
            None => CipherKind::default(),
        };
        let cipher_key = get(WALLET_CIPHER_KEY_ENV)
            .ok_or(ConfigError::Missing(WALLET_CIPHER_KEY_ENV))
            .and_then(|encoded| {
                CipherKey::from_base64(&encoded)
                    .map_err(|e| ConfigError::invalid(WALLET_CIPHER_KEY_ENV, e))
            })?;
        let max_secret_len = parse_or(&get, WALLET_MAX_SECRET_LEN_ENV, DEFAULT_MAX_SECRET_LEN)?;

        let defaults = TransferSettings::for_chain(network.chain_id);
        let sweep_policy = match get(TX_SWEEP_POLICY_ENV) {
            Some(raw) => SweepPolicy::from_str(&raw)
                .map_err(|e| ConfigError::invalid(TX_SWEEP_POLICY_ENV, e))?,
            None => defaults.sweep_policy,
        };
        let transfer = TransferSettings {
            max_fee_per_gas: parse_or(&get, TX_MAX_FEE_PER_GAS_ENV, defaults.max_fee_per_gas)?,
            max_priority_fee_per_gas: parse_or(
                &get,
                TX_MAX_PRIORITY_FEE_PER_GAS_ENV,
                defaults.max_priority_fee_per_gas,
            )?,
            tx_type: parse_or(&get, TX_TYPE_ENV, defaults.tx_type)?,
            chain_id: parse_or(&get, TX_CHAIN_ID_ENV, defaults.chain_id)?,
            gas_limit: parse_or(&get, TX_GAS_LIMIT_ENV, defaults.gas_limit)?,
            sweep_policy,
        };
        if transfer.max_priority_fee_per_gas > transfer.max_fee_per_gas {
            return Err(ConfigError::invalid(
                TX_MAX_PRIORITY_FEE_PER_GAS_ENV,
                "must not exceed TX_MAX_FEE_PER_GAS",
            ));
        }

        Ok(Self {
            bind_addr,
            tls,
            storage,
            network,
            cipher,
            cipher_key,
            max_secret_len,
            transfer,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(name, e)),
        None => Ok(default),
    }
}
