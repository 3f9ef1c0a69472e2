// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wei per gwei.
pub const GWEI: u128 = 1_000_000_000;

/// Intrinsic gas cost of a plain value transfer with empty calldata.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Ethereum network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
}

impl NetworkConfig {
    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            name: "Ethereum Mainnet",
            chain_id: 1,
            rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
        }
    }

    /// Sepolia testnet.
    pub fn sepolia() -> Self {
        Self {
            name: "Sepolia Testnet",
            chain_id: 11_155_111,
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
        }
    }

    /// Resolve a network preset by its short name.
    pub fn from_name(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::mainnet()),
            "sepolia" => Ok(Self::sepolia()),
            other => Err(format!(
                "Unknown network `{other}` (expected `mainnet` or `sepolia`)"
            )),
        }
    }

    /// Replace the preset RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

/// Currencies a custodial wallet can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Currency {
    /// Ether on an Ethereum-compatible chain.
    #[serde(rename = "eth")]
    Ethereum,
}

impl Currency {
    /// Stable short code used in storage keys and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ethereum => "eth",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Ethereum
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eth" => Ok(Currency::Ethereum),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// Whether `address` is `0x` followed by exactly 40 hex characters.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_presets_resolve_by_name() {
        assert_eq!(NetworkConfig::from_name("mainnet").unwrap().chain_id, 1);
        assert_eq!(NetworkConfig::from_name(" Sepolia ").unwrap().chain_id, 11_155_111);
        assert!(NetworkConfig::from_name("goerli").is_err());
    }

    #[test]
    fn rpc_url_can_be_overridden() {
        let network = NetworkConfig::sepolia().with_rpc_url("http://localhost:8545");
        assert_eq!(network.rpc_url, "http://localhost:8545");
        assert_eq!(network.chain_id, 11_155_111);
    }

    #[test]
    fn currency_parses_known_codes_only() {
        assert_eq!("eth".parse::<Currency>().unwrap(), Currency::Ethereum);
        assert_eq!(
            "btc".parse::<Currency>().unwrap_err(),
            "\"btc\" is not a valid choice."
        );
        assert!("ETH".parse::<Currency>().is_err());
    }

    #[test]
    fn currency_serializes_as_code() {
        let json = serde_json::to_string(&Currency::Ethereum).unwrap();
        assert_eq!(json, "\"eth\"");
        assert_eq!(Currency::Ethereum.to_string(), "eth");
    }

    #[test]
    fn address_format_validation() {
        assert!(is_valid_address("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12"));
        assert!(!is_valid_address("742d35Cc6634C0532925a3b844Bc9e7595f4aB12"));
        assert!(!is_valid_address("1x742d35Cc6634C0532925a3b844Bc9e7595f4aB12"));
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB1"));
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b844Bc9e7595f4aBzz"));
    }
}
