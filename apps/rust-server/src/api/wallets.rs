// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet management API endpoints.
//!
//! These endpoints handle wallet creation, listing and sweep transfers.
//! Private keys are accepted on import but never returned.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;

use crate::{
    blockchain::{keys::parse_private_key, Currency},
    error::ApiError,
    models::{
        CreateWalletRequest, TextField, TransferRequest, TransferResponse, WalletSummary,
        NOT_A_STRING,
    },
    state::AppState,
    storage::{AuditEvent, AuditEventType},
    transfer::TransferError,
};

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Optional string field; a non-string value is a field error.
fn optional_text<'a>(
    value: Option<&'a TextField>,
    field: &str,
) -> Result<Option<&'a str>, ApiError> {
    match value {
        None => Ok(None),
        Some(TextField::Text(text)) => Ok(Some(text)),
        Some(TextField::Other(_)) => Err(ApiError::field(field, NOT_A_STRING)),
    }
}

/// Create a custodial wallet.
///
/// Generates a new secp256k1 key unless one is imported, derives the
/// address and stores the key encrypted. Returns only the address and
/// currency.
#[utoipa::path(
    post,
    path = "/api/wallets",
    tag = "Wallets",
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet created successfully", body = WalletSummary),
        (status = 400, description = "Invalid currency or private key", body = crate::error::ErrorBody),
        (status = 409, description = "Wallet already exists", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
pub async fn create_wallet(
    State(state): State<AppState>,
    payload: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WalletSummary>), ApiError> {
    let request = json_body(payload)?;

    let currency = match optional_text(request.currency.as_ref(), "currency")? {
        Some(raw) => Currency::from_str(raw).map_err(|msg| ApiError::field("currency", msg))?,
        None => Currency::default(),
    };
    let private_key = optional_text(request.private_key.as_ref(), "private_key")?;
    if let Some(key) = private_key {
        parse_private_key(key)
            .map_err(|_| ApiError::field("private_key", "Enter a valid private key."))?;
    }

    let wallet = state.wallets.create(currency, private_key, None)?;

    state.audit.record(
        AuditEvent::new(AuditEventType::WalletCreated)
            .with_resource("wallet", &wallet.address)
            .with_details(serde_json::json!({
                "currency": currency.code(),
                "imported": private_key.is_some(),
            })),
    );

    Ok((StatusCode::CREATED, Json(WalletSummary::from(&wallet))))
}

/// List all custodial wallets, newest first.
#[utoipa::path(
    get,
    path = "/api/wallets",
    tag = "Wallets",
    responses(
        (status = 200, description = "List of wallets", body = [WalletSummary]),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
pub async fn list_wallets(
    State(state): State<AppState>,
) -> Result<Json<Vec<WalletSummary>>, ApiError> {
    let wallets = state.wallets.list()?;
    Ok(Json(wallets.iter().map(WalletSummary::from).collect()))
}

/// Sweep the whole balance of a wallet to another address.
///
/// Signs an EIP-1559 transaction with the stored key and broadcasts it.
#[utoipa::path(
    post,
    path = "/api/wallets/transfer",
    tag = "Wallets",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transaction broadcast", body = TransferResponse),
        (status = 400, description = "Invalid request, unknown wallet or insufficient funds", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody),
        (status = 502, description = "Node rejected the transaction", body = crate::error::ErrorBody),
        (status = 503, description = "Blockchain node unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let request = json_body(payload)?;

    match state.transfers.transfer(&request).await {
        Ok(receipt) => {
            state.audit.record(
                AuditEvent::new(AuditEventType::TransferBroadcast)
                    .with_resource("wallet", &receipt.from)
                    .with_details(serde_json::json!({
                        "to": receipt.to,
                        "value": receipt.value.to_string(),
                        "nonce": receipt.nonce,
                        "tx_hash": receipt.hash,
                    })),
            );
            Ok(Json(TransferResponse::from(receipt)))
        }
        Err(err) => {
            if matches!(
                err,
                TransferError::WalletNotFound { .. }
                    | TransferError::InsufficientFunds { .. }
                    | TransferError::Broadcast(_)
            ) {
                state.audit.record(
                    AuditEvent::new(AuditEventType::TransferRejected)
                        .with_resource(
                            "wallet",
                            request
                                .from
                                .as_ref()
                                .and_then(TextField::as_text)
                                .unwrap_or_default(),
                        )
                        .with_details(serde_json::json!({ "to": request.to }))
                        .failed(err.to_string()),
                );
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::{MockChainClient, MOCK_TX_HASH};
    use crate::storage::cipher::{CipherKey, CipherKind, CIPHER_KEY_LEN};
    use crate::storage::{WalletDatabase, WalletRepository, DEFAULT_MAX_SECRET_LEN};
    use crate::transfer::TransferSettings;
    use std::sync::Arc;
    use tempfile::TempDir;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const DEST: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn test_state(chain: MockChainClient) -> (TempDir, AppState) {
        let temp = TempDir::new().unwrap();
        let db = WalletDatabase::open(&temp.path().join("wallets.redb")).unwrap();
        let cipher = CipherKind::Aes256Gcm
            .build(&CipherKey::new([4u8; CIPHER_KEY_LEN]))
            .unwrap();
        let wallets = WalletRepository::new(db.clone(), cipher, DEFAULT_MAX_SECRET_LEN);
        let state = AppState::new(
            db,
            wallets,
            Arc::new(chain),
            TransferSettings::for_chain(11155111),
        );
        (temp, state)
    }

    fn create_body(
        currency: Option<&str>,
        private_key: Option<&str>,
    ) -> Result<Json<CreateWalletRequest>, JsonRejection> {
        Ok(Json(CreateWalletRequest {
            currency: currency.map(TextField::from),
            private_key: private_key.map(TextField::from),
        }))
    }

    fn transfer_body(from: &str, to: &str) -> Result<Json<TransferRequest>, JsonRejection> {
        Ok(Json(TransferRequest {
            from: Some(from.into()),
            to: Some(to.into()),
            currency: Some("eth".into()),
        }))
    }

    #[tokio::test]
    async fn create_wallet_returns_address_and_currency() {
        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));

        let (status, Json(summary)) = create_wallet(State(state.clone()), create_body(None, None))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(summary.address.len(), 42);
        assert_eq!(summary.currency, Currency::Ethereum);

        let events = state.audit.list_recent(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AuditEventType::WalletCreated);
        assert_eq!(events[0].resource_id.as_deref(), Some(summary.address.as_str()));
    }

    #[tokio::test]
    async fn create_wallet_imports_key() {
        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));

        let (_, Json(summary)) = create_wallet(State(state), create_body(Some("eth"), Some(DEV_KEY)))
            .await
            .unwrap();
        assert_eq!(summary.address, DEV_ADDRESS);
    }

    #[tokio::test]
    async fn create_wallet_rejects_bad_input() {
        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));

        let err = create_wallet(State(state.clone()), create_body(Some("btc"), None))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("currency"));

        let err = create_wallet(State(state.clone()), create_body(None, Some("0x1234")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("private_key"));

        // Right length, but the second prefix leaves only 31 bytes of key.
        let doubled = format!("0x0x{}", &DEV_KEY[2..64]);
        let err = create_wallet(State(state.clone()), create_body(None, Some(&doubled)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("private_key"));

        let numeric = Ok(Json(CreateWalletRequest {
            currency: Some(TextField::Other(serde_json::json!(1))),
            private_key: None,
        }));
        let err = create_wallet(State(state.clone()), numeric).await.unwrap_err();
        assert_eq!(
            err.fields.unwrap()["currency"],
            vec![NOT_A_STRING.to_string()]
        );

        let Json(wallets) = list_wallets(State(state)).await.unwrap();
        assert!(wallets.is_empty());
    }

    #[tokio::test]
    async fn create_duplicate_wallet_conflicts() {
        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));

        create_wallet(State(state.clone()), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap();
        let err = create_wallet(State(state), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_wallets_never_exposes_keys() {
        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));
        create_wallet(State(state.clone()), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap();
        create_wallet(State(state.clone()), create_body(None, None))
            .await
            .unwrap();

        let Json(wallets) = list_wallets(State(state)).await.unwrap();
        assert_eq!(wallets.len(), 2);

        let json = serde_json::to_string(&wallets).unwrap();
        assert!(!json.contains(&DEV_KEY[2..]));
        assert!(!json.contains("private_key"));
    }

    #[tokio::test]
    async fn corrupt_stored_wallet_is_a_generic_internal_error() {
        use crate::storage::database::WALLETS;
        use crate::storage::StoredWallet;
        use chrono::Utc;

        let (_temp, state) = test_state(MockChainClient::new(0, 0, 0));
        let stored = StoredWallet {
            wallet_id: "not-a-uuid".to_string(),
            currency: Currency::Ethereum,
            address: DEV_ADDRESS.to_string(),
            private_key_secret: "irrelevant".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec(&stored).unwrap();
        let write_txn = state.db.inner().begin_write().unwrap();
        {
            let mut table = write_txn.open_table(WALLETS).unwrap();
            table.insert("not-a-uuid", json.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        let err = list_wallets(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
        assert!(err.fields.is_none());
    }

    #[tokio::test]
    async fn transfer_returns_hash_and_nonce() {
        let (_temp, state) = test_state(MockChainClient::new(5_000_000_000, 4, 9));
        create_wallet(State(state.clone()), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap();

        let Json(response) = transfer(State(state.clone()), transfer_body(DEV_ADDRESS, DEST))
            .await
            .unwrap();
        assert_eq!(response.hash, MOCK_TX_HASH);
        assert_eq!(response.nonce, 9);

        let events = state.audit.search_by_resource("wallet", DEV_ADDRESS).unwrap();
        assert!(events
            .iter()
            .any(|e| e.event_type == AuditEventType::TransferBroadcast && e.success));
    }

    #[tokio::test]
    async fn transfer_rejections_are_audited() {
        let (_temp, state) = test_state(MockChainClient::new(3_000_000_000, 4, 0));
        create_wallet(State(state.clone()), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap();

        let err = transfer(State(state.clone()), transfer_body(DEV_ADDRESS, DEST))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("_from"));

        let events = state.audit.search_by_resource("wallet", DEV_ADDRESS).unwrap();
        let rejected = events
            .iter()
            .find(|e| e.event_type == AuditEventType::TransferRejected)
            .unwrap();
        assert!(!rejected.success);
    }

    #[tokio::test]
    async fn transfer_from_unknown_wallet_is_bad_request() {
        let (_temp, state) = test_state(MockChainClient::new(5_000_000_000, 4, 0));

        let err = transfer(State(state), transfer_body(DEST, DEV_ADDRESS))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.fields.unwrap()["_from"],
            vec!["Wallet not found.".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_broadcast_is_bad_gateway() {
        let (_temp, state) =
            test_state(MockChainClient::new(5_000_000_000, 4, 0).failing_broadcast());
        create_wallet(State(state.clone()), create_body(None, Some(DEV_KEY)))
            .await
            .unwrap();

        let err = transfer(State(state), transfer_body(DEV_ADDRESS, DEST))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
