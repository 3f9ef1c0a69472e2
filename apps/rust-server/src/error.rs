// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::ChainError;
use crate::storage::StoreError;
use crate::transfer::{FieldErrors, TransferError};

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Option<FieldErrors>,
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable summary.
    pub error: String,
    /// Field name -> messages, for field-addressed failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Generic 500. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = Some(fields);
        self
    }

    /// 400 with a single field message.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::bad_request("Invalid request").with_fields(fields)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateWallet { .. } => {
                Self::conflict("Wallet with this address and currency already exists")
            }
            other => Self::internal(other),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        if let Some(fields) = err.fields() {
            let message = match &err {
                TransferError::WalletNotFound { .. } => "Wallet not found",
                TransferError::InsufficientFunds { .. } => "Insufficient funds",
                _ => "Invalid transfer request",
            };
            return Self::bad_request(message).with_fields(fields);
        }

        match err {
            TransferError::Broadcast(message) => {
                tracing::warn!(error = %message, "Transaction broadcast rejected");
                Self::bad_gateway(format!("Transaction broadcast failed: {message}"))
            }
            TransferError::Chain(ChainError::InvalidPrivateKey(detail)) => Self::internal(detail),
            TransferError::Chain(e) => {
                tracing::warn!(error = %e, "Blockchain node error");
                Self::service_unavailable("Blockchain node unavailable")
            }
            TransferError::Store(e) => e.into(),
            // Field-addressed variants returned above
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}
