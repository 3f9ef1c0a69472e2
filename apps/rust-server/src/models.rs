// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Body types derive
//! `ToSchema` for OpenAPI documentation.
//!
//! Request fields are optional [`TextField`]s so that missing, malformed or
//! wrongly typed values surface as field-addressed validation errors instead
//! of JSON rejections.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::Currency;
use crate::storage::Wallet;
use crate::transfer::TransferReceipt;

/// Message for a request field that is present but not a JSON string.
pub const NOT_A_STRING: &str = "Not a valid string.";

/// A request field that accepts any JSON value.
///
/// Only [`TextField::Text`] is usable; anything else is reported against the
/// field by the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Text(String),
    Other(serde_json::Value),
}

impl TextField {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TextField::Text(text) => Some(text),
            TextField::Other(_) => None,
        }
    }
}

impl From<&str> for TextField {
    fn from(text: &str) -> Self {
        TextField::Text(text.to_string())
    }
}

impl From<String> for TextField {
    fn from(text: String) -> Self {
        TextField::Text(text)
    }
}

// =============================================================================
// Wallet Models
// =============================================================================

/// Request to create a custodial wallet.
///
/// Both fields are optional: the currency defaults to `eth` and a fresh
/// private key is generated when none is imported.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    /// Currency code (`eth`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub currency: Option<TextField>,
    /// Private key to import (`0x` + 64 hex). Write-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub private_key: Option<TextField>,
}

impl fmt::Debug for CreateWalletRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateWalletRequest")
            .field("currency", &self.currency)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Public view of a wallet. Never carries key material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WalletSummary {
    /// EIP-55 checksummed address.
    pub address: String,
    /// Currency held by the wallet.
    pub currency: Currency,
}

impl From<&Wallet> for WalletSummary {
    fn from(wallet: &Wallet) -> Self {
        Self {
            address: wallet.address.clone(),
            currency: wallet.currency,
        }
    }
}

// =============================================================================
// Transfer Models
// =============================================================================

/// Request to sweep the whole balance of a wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TransferRequest {
    /// Source wallet address.
    #[serde(rename = "_from", default)]
    #[schema(value_type = Option<String>)]
    pub from: Option<TextField>,
    /// Destination address.
    #[serde(rename = "_to", default)]
    #[schema(value_type = Option<String>)]
    pub to: Option<TextField>,
    /// Currency code (`eth`).
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub currency: Option<TextField>,
}

/// Result of a broadcast transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TransferResponse {
    /// Transaction hash (`0x` + 64 hex).
    pub hash: String,
    /// Nonce used for the transaction.
    pub nonce: u64,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            hash: receipt.hash,
            nonce: receipt.nonce,
        }
    }
}
