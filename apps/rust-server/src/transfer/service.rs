// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sweep transfer orchestration.
//!
//! ## Flow
//!
//! 1. Validate the request fields (no store or chain access on failure)
//! 2. Resolve the source wallet and decrypt its key
//! 3. Quote balance, gas price and nonce concurrently
//! 4. Validate funds against the gas price quote
//! 5. Compute the value from the sweep policy
//! 6. Sign the EIP-1559 envelope and broadcast it

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, I256, U256};

use super::error::{FieldErrors, TransferError, FIELD_CURRENCY, FIELD_FROM, FIELD_TO};
use super::locks::AddressLocks;
use super::policy::TransferSettings;
use super::quote::Quote;
use crate::blockchain::{
    format_amount, is_valid_address, ChainClient, ChainError, Currency, TransferEnvelope,
};
use crate::models::{TextField, TransferRequest, NOT_A_STRING};
use crate::storage::WalletRepository;

const REQUIRED: &str = "This field is required.";
const INVALID_ADDRESS: &str = "Enter a valid Ethereum address.";

/// Outcome of a broadcast transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub hash: String,
    pub nonce: u64,
    pub from: String,
    pub to: String,
    pub value: U256,
}

/// A request whose fields passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub from: Address,
    pub from_raw: String,
    pub to: Address,
    pub currency: Currency,
}

/// Check every field and collect all failures at once.
pub fn validate_request(request: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
    let mut errors = FieldErrors::new();

    let from = parse_address_field(request.from.as_ref(), FIELD_FROM, &mut errors);
    let to = parse_address_field(request.to.as_ref(), FIELD_TO, &mut errors);
    let currency = text_field(request.currency.as_ref(), FIELD_CURRENCY, &mut errors).and_then(
        |raw| match Currency::from_str(raw) {
            Ok(currency) => Some(currency),
            Err(message) => {
                push_error(&mut errors, FIELD_CURRENCY, &message);
                None
            }
        },
    );

    match (from, to, currency) {
        (Some((from, from_raw)), Some((to, _)), Some(currency)) if errors.is_empty() => {
            Ok(ValidatedTransfer {
                from,
                from_raw: from_raw.to_string(),
                to,
                currency,
            })
        }
        _ => Err(TransferError::Validation(errors)),
    }
}

/// The string value of a field, or `None` with the failure recorded.
fn text_field<'a>(
    value: Option<&'a TextField>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match value {
        None => {
            push_error(errors, field, REQUIRED);
            None
        }
        Some(TextField::Other(_)) => {
            push_error(errors, field, NOT_A_STRING);
            None
        }
        Some(TextField::Text(raw)) => Some(raw),
    }
}

fn parse_address_field<'a>(
    value: Option<&'a TextField>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<(Address, &'a str)> {
    let raw = text_field(value, field, errors)?;
    if !is_valid_address(raw) {
        push_error(errors, field, INVALID_ADDRESS);
        return None;
    }
    match Address::from_str(raw) {
        Ok(address) => Some((address, raw)),
        Err(_) => {
            push_error(errors, field, INVALID_ADDRESS);
            None
        }
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Executes sweep transfers from custodial wallets.
pub struct TransferService {
    wallets: WalletRepository,
    chain: Arc<dyn ChainClient>,
    settings: TransferSettings,
    locks: AddressLocks,
}

impl TransferService {
    pub fn new(
        wallets: WalletRepository,
        chain: Arc<dyn ChainClient>,
        settings: TransferSettings,
    ) -> Self {
        Self {
            wallets,
            chain,
            settings,
            locks: AddressLocks::new(),
        }
    }

    /// Move the whole balance of `_from` to `_to`.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        let validated = validate_request(request)?;
        let _guard = self.locks.acquire(&validated.from_raw).await;

        let wallet = self
            .wallets
            .get(&validated.from_raw, validated.currency)?
            .ok_or_else(|| TransferError::wallet_not_found(&validated.from_raw))?;

        let quote = Quote::new(self.chain.as_ref(), validated.from);
        quote.prefetch().await.map_err(TransferError::Chain)?;

        let balance = quote.balance().await.map_err(TransferError::Chain)?;
        let gas_price_wei = quote.gas_price_wei().await.map_err(TransferError::Chain)?;
        if balance <= I256::ZERO {
            return Err(TransferError::insufficient_funds(format!(
                "balance {balance} wei is not positive"
            )));
        }
        if balance <= gas_price_wei {
            return Err(TransferError::insufficient_funds(format!(
                "balance {balance} wei does not exceed gas price {gas_price_wei} wei"
            )));
        }

        let value = self.settings.sweep_value(balance)?;
        let nonce = quote.nonce().await.map_err(TransferError::Chain)?;

        let envelope = TransferEnvelope {
            from: validated.from,
            to: validated.to,
            value,
            nonce,
            gas_limit: self.settings.gas_limit,
            max_fee_per_gas: self.settings.max_fee_per_gas,
            max_priority_fee_per_gas: self.settings.max_priority_fee_per_gas,
            tx_type: self.settings.tx_type,
            chain_id: self.settings.chain_id,
            input: Bytes::new(),
        };

        tracing::debug!(
            from = %wallet.address,
            to = %validated.to,
            value = %value,
            max_fee = %envelope.max_fee_cost(),
            nonce = nonce,
            "Signing sweep transfer"
        );

        let hash = self
            .chain
            .sign_and_send(&envelope, wallet.private_key())
            .await
            .map_err(|e| match e {
                ChainError::TransactionFailed(message) => TransferError::Broadcast(message),
                other => TransferError::Chain(other),
            })?;

        tracing::info!(
            from = %wallet.address,
            to = %validated.to,
            amount_eth = %format_amount(value, 18),
            nonce = nonce,
            tx_hash = %hash,
            "Sweep transfer broadcast"
        );

        Ok(TransferReceipt {
            hash,
            nonce,
            from: wallet.address.clone(),
            to: validated.to.to_checksum(None),
            value,
        })
    }
}
