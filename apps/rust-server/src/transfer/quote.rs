// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain reads needed to price a single transfer.

use alloy::primitives::{Address, I256};
use tokio::sync::OnceCell;

use crate::blockchain::{ChainClient, ChainError, GWEI};

/// Memoized quotes for one source address.
///
/// Each value is fetched from the node at most once, however often it is
/// read. A `Quote` lives for one request and is never shared.
pub struct Quote<'a> {
    chain: &'a dyn ChainClient,
    address: Address,
    balance: OnceCell<I256>,
    gas_price_gwei: OnceCell<u64>,
    nonce: OnceCell<u64>,
}

impl<'a> Quote<'a> {
    pub fn new(chain: &'a dyn ChainClient, address: Address) -> Self {
        Self {
            chain,
            address,
            balance: OnceCell::new(),
            gas_price_gwei: OnceCell::new(),
            nonce: OnceCell::new(),
        }
    }

    /// Issue all three reads concurrently.
    pub async fn prefetch(&self) -> Result<(), ChainError> {
        tokio::try_join!(self.balance(), self.gas_price_gwei(), self.nonce())?;
        Ok(())
    }

    /// Source balance in wei.
    pub async fn balance(&self) -> Result<I256, ChainError> {
        self.balance
            .get_or_try_init(|| self.chain.get_balance(self.address))
            .await
            .copied()
    }

    /// Suggested gas price in whole gwei.
    pub async fn gas_price_gwei(&self) -> Result<u64, ChainError> {
        self.gas_price_gwei
            .get_or_try_init(|| self.chain.suggest_gas_price())
            .await
            .copied()
    }

    /// Suggested gas price converted to wei.
    pub async fn gas_price_wei(&self) -> Result<I256, ChainError> {
        let gwei = self.gas_price_gwei().await?;
        I256::try_from(u128::from(gwei) * GWEI)
            .map_err(|e| ChainError::RpcError(format!("Gas price out of range: {e}")))
    }

    /// Transaction count of the source address.
    pub async fn nonce(&self) -> Result<u64, ChainError> {
        self.nonce
            .get_or_try_init(|| self.chain.get_transaction_count(self.address))
            .await
            .copied()
    }
}
