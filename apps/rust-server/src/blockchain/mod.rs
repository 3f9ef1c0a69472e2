// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Ethereum.
//!
//! This module provides functionality for:
//! - Generating private keys and deriving addresses
//! - Querying balances, gas prices and nonces
//! - Transaction signing and broadcasting

pub mod client;
pub mod keys;
#[cfg(test)]
pub mod mock;
pub mod transactions;
pub mod types;

pub use client::{ChainClient, ChainError, EvmClient};
pub use keys::{derive_address, generate_key, signer_from_key, KeyError};
pub use transactions::{format_amount, TransferEnvelope};
pub use types::*;
