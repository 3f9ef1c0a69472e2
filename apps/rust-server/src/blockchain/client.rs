// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ethereum JSON-RPC client for blockchain interactions.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, I256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::keys::signer_from_key;
use super::transactions::TransferEnvelope;
use super::types::{NetworkConfig, GWEI};

/// HTTP provider type for read-only queries (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Chain operations the transfer flow depends on.
///
/// Implementations own their transport, deadlines and retry policy; callers
/// never retry.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current balance of `address` in wei.
    ///
    /// Signed so that a nonsensical negative report from a node is rejected
    /// by validation instead of wrapping around.
    async fn get_balance(&self, address: Address) -> Result<I256, ChainError>;

    /// Suggested gas price as a whole number of gwei (may be 0).
    async fn suggest_gas_price(&self) -> Result<u64, ChainError>;

    /// Transaction count (next nonce) of `address`.
    async fn get_transaction_count(&self, address: Address) -> Result<u64, ChainError>;

    /// Sign `envelope` with `private_key` and broadcast it.
    ///
    /// Returns the transaction hash as `0x`-prefixed hex.
    async fn sign_and_send(
        &self,
        envelope: &TransferEnvelope,
        private_key: &str,
    ) -> Result<String, ChainError>;
}

/// Ethereum client backed by an alloy HTTP provider.
pub struct EvmClient {
    /// Parsed RPC endpoint, reused for signing providers
    rpc_url: url::Url,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl EvmClient {
    /// Create a new client for the specified network.
    pub fn new(network: NetworkConfig) -> Result<Self, ChainError> {
        let rpc_url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone());

        Ok(Self { rpc_url, provider })
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    async fn get_balance(&self, address: Address) -> Result<I256, ChainError> {
        let balance = self
            .provider
            .get_balance(address)
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        I256::try_from(balance)
            .map_err(|e| ChainError::RpcError(format!("Balance out of range: {e}")))
    }

    async fn suggest_gas_price(&self) -> Result<u64, ChainError> {
        let wei = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        // Whole gwei, rounded down.
        Ok(u64::try_from(wei / GWEI).unwrap_or(u64::MAX))
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))
    }

    async fn sign_and_send(
        &self,
        envelope: &TransferEnvelope,
        private_key: &str,
    ) -> Result<String, ChainError> {
        let signer = signer_from_key(private_key)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        if signer.address() != envelope.from {
            return Err(ChainError::InvalidPrivateKey(
                "Key does not control the sender address".to_string(),
            ));
        }

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone());

        let pending = provider
            .send_transaction(envelope.to_request())
            .await
            .map_err(|e| ChainError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(format!("{:?}", pending.tx_hash()))
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}
