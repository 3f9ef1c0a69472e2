// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory chain client for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, I256};
use async_trait::async_trait;

use super::client::{ChainClient, ChainError};
use super::keys::signer_from_key;
use super::transactions::TransferEnvelope;

/// Hash returned by every successful [`MockChainClient::sign_and_send`].
pub const MOCK_TX_HASH: &str =
    "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// Scriptable chain client that records how often each call was made.
pub struct MockChainClient {
    pub balance: I256,
    pub gas_price_gwei: u64,
    pub nonce: u64,
    pub fail_broadcast: bool,
    pub balance_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub nonce_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub sent: Mutex<Vec<TransferEnvelope>>,
}

impl MockChainClient {
    pub fn new(balance: i64, gas_price_gwei: u64, nonce: u64) -> Self {
        Self {
            balance: I256::try_from(balance).expect("i64 fits in I256"),
            gas_price_gwei,
            nonce,
            fail_broadcast: false,
            balance_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            nonce_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_broadcast(mut self) -> Self {
        self.fail_broadcast = true;
        self
    }

    /// Total number of calls across all four operations.
    pub fn total_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
            + self.gas_price_calls.load(Ordering::SeqCst)
            + self.nonce_calls.load(Ordering::SeqCst)
            + self.send_calls.load(Ordering::SeqCst)
    }

    pub fn last_sent(&self) -> Option<TransferEnvelope> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_balance(&self, _address: Address) -> Result<I256, ChainError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn suggest_gas_price(&self) -> Result<u64, ChainError> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price_gwei)
    }

    async fn get_transaction_count(&self, _address: Address) -> Result<u64, ChainError> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.nonce)
    }

    async fn sign_and_send(
        &self,
        envelope: &TransferEnvelope,
        private_key: &str,
    ) -> Result<String, ChainError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        let signer = signer_from_key(private_key)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;
        assert_eq!(signer.address(), envelope.from, "signed with the wrong key");

        if self.fail_broadcast {
            return Err(ChainError::TransactionFailed(
                "Failed to send: nonce too low".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(envelope.clone());
        Ok(MOCK_TX_HASH.to_string())
    }
}
