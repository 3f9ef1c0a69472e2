// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use crate::blockchain::ChainError;
use crate::storage::StoreError;

/// Request field name -> human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const FIELD_FROM: &str = "_from";
pub const FIELD_TO: &str = "_to";
pub const FIELD_CURRENCY: &str = "currency";

/// Errors raised by the transfer flow.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// One or more request fields are missing or malformed.
    #[error("Invalid transfer request")]
    Validation(FieldErrors),

    /// No wallet is stored for the source address and currency.
    #[error("Wallet not found: {address}")]
    WalletNotFound { address: String },

    /// The source balance cannot cover the transfer.
    #[error("Insufficient funds: {reason}")]
    InsufficientFunds { reason: String },

    /// The node rejected the signed transaction.
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error(transparent)]
    Chain(ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransferError {
    pub fn wallet_not_found(address: impl Into<String>) -> Self {
        Self::WalletNotFound {
            address: address.into(),
        }
    }

    pub fn insufficient_funds(reason: impl Into<String>) -> Self {
        Self::InsufficientFunds {
            reason: reason.into(),
        }
    }

    /// Field-addressed messages for user-correctable failures.
    ///
    /// Returns `None` for integrity, storage and chain failures.
    pub fn fields(&self) -> Option<FieldErrors> {
        match self {
            TransferError::Validation(fields) => Some(fields.clone()),
            TransferError::WalletNotFound { .. } => {
                Some(single_field(FIELD_FROM, "Wallet not found."))
            }
            TransferError::InsufficientFunds { .. } => {
                Some(single_field(FIELD_FROM, "Insufficient funds."))
            }
            _ => None,
        }
    }
}

fn single_field(field: &str, message: &str) -> FieldErrors {
    let mut fields = FieldErrors::new();
    fields.insert(field.to_string(), vec![message.to_string()]);
    fields
}
