// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fee defaults and the amount a sweep sends.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{I256, U256};

use super::error::TransferError;
use crate::blockchain::NATIVE_TRANSFER_GAS;

/// How much of the source balance a sweep sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    /// Send the entire balance; fees must be covered by the node's
    /// acceptance of the transaction.
    #[default]
    FullBalance,
    /// Send the balance minus the worst-case fee
    /// (`gas_limit * max_fee_per_gas`).
    BalanceMinusFee,
}

impl SweepPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SweepPolicy::FullBalance => "full-balance",
            SweepPolicy::BalanceMinusFee => "balance-minus-fee",
        }
    }
}

impl fmt::Display for SweepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full-balance" => Ok(SweepPolicy::FullBalance),
            "balance-minus-fee" => Ok(SweepPolicy::BalanceMinusFee),
            other => Err(format!(
                "unknown sweep policy `{other}` (expected full-balance or balance-minus-fee)"
            )),
        }
    }
}

/// Static transaction parameters applied to every transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    /// Max fee per gas in wei
    pub max_fee_per_gas: u128,
    /// Max priority fee per gas in wei
    pub max_priority_fee_per_gas: u128,
    /// Envelope type (2 = EIP-1559)
    pub tx_type: u8,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub sweep_policy: SweepPolicy,
}

impl TransferSettings {
    /// Defaults for the given chain id.
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            max_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 1_500_000_000,
            tx_type: 2,
            chain_id,
            gas_limit: NATIVE_TRANSFER_GAS,
            sweep_policy: SweepPolicy::FullBalance,
        }
    }

    /// Worst-case fee of one transfer in wei.
    pub fn max_fee_cost(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.max_fee_per_gas)
    }

    /// Amount to send from a balance that already passed funds validation.
    pub fn sweep_value(&self, balance: I256) -> Result<U256, TransferError> {
        if balance <= I256::ZERO {
            return Err(TransferError::insufficient_funds("balance is not positive"));
        }
        let balance = balance.into_raw();

        match self.sweep_policy {
            SweepPolicy::FullBalance => Ok(balance),
            SweepPolicy::BalanceMinusFee => match balance.checked_sub(self.max_fee_cost()) {
                Some(value) if !value.is_zero() => Ok(value),
                _ => Err(TransferError::insufficient_funds(
                    "balance does not cover the maximum fee",
                )),
            },
        }
    }
}
