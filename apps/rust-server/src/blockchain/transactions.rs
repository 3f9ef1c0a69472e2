// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction envelopes for native ETH transfers.
//!
//! The envelope carries every field the node needs, so the signing provider's
//! fillers never have to query the network again before broadcasting.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::TransactionRequest,
};

/// Fully specified, unsigned native transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEnvelope {
    /// Sender address (must match the signing key)
    pub from: Address,
    /// Recipient address
    pub to: Address,
    /// Amount in wei
    pub value: U256,
    /// Sender transaction count at quote time
    pub nonce: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Max fee per gas in wei
    pub max_fee_per_gas: u128,
    /// Max priority fee per gas in wei
    pub max_priority_fee_per_gas: u128,
    /// EIP-2718 transaction type
    pub tx_type: u8,
    /// Chain ID
    pub chain_id: u64,
    /// Calldata (empty for plain transfers)
    pub input: Bytes,
}

impl TransferEnvelope {
    /// Upper bound of the fee the sender can be charged for this envelope.
    pub fn max_fee_cost(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.max_fee_per_gas)
    }

    /// Convert into an alloy request ready for a wallet-enabled provider.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .from(self.from)
            .to(self.to)
            .value(self.value)
            .nonce(self.nonce)
            .gas_limit(self.gas_limit)
            .max_fee_per_gas(self.max_fee_per_gas)
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .transaction_type(self.tx_type)
            .input(self.input.clone().into())
            .with_chain_id(self.chain_id)
    }
}

/// Format wei to a human-readable ETH amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
