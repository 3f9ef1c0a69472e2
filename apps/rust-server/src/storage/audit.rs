// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Wallet creation and every transfer outcome are appended to the
//! `audit_events` table. Keys sort by time so recent events can be
//! read back with a reverse scan.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{StoreResult, WalletDatabase, AUDIT_EVENTS};

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Wallet events
    WalletCreated,

    // Transfer events
    TransferBroadcast,
    TransferRejected,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// Resource affected (wallet address, transaction hash).
    pub resource_id: Option<String>,
    /// Resource type (wallet, transfer).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    fn storage_key(&self) -> Vec<u8> {
        let millis = self.timestamp.timestamp_millis().max(0) as u64;
        let mut key = Vec::with_capacity(8 + self.event_id.len());
        key.extend_from_slice(&millis.to_be_bytes());
        key.extend_from_slice(self.event_id.as_bytes());
        key
    }
}

/// Repository for audit events.
#[derive(Clone)]
pub struct AuditRepository {
    db: WalletDatabase,
}

impl AuditRepository {
    /// Create a new audit repository.
    pub fn new(db: WalletDatabase) -> Self {
        Self { db }
    }

    /// Append an audit event.
    pub fn log(&self, event: &AuditEvent) -> StoreResult<()> {
        let value = serde_json::to_vec(event)?;
        let key = event.storage_key();

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(AUDIT_EVENTS)?;
            table.insert(key.as_slice(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Append an audit event, logging instead of failing on storage errors.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.log(&event) {
            tracing::warn!(
                error = %e,
                event_type = ?event.event_type,
                "Failed to write audit event"
            );
        }
    }

    /// Read the most recent events, newest first.
    pub fn list_recent(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(AUDIT_EVENTS)?;

        let mut events = Vec::new();
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            events.push(serde_json::from_slice(value.value())?);
        }
        Ok(events)
    }

    /// Events for a single resource, newest first.
    pub fn search_by_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> StoreResult<Vec<AuditEvent>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(AUDIT_EVENTS)?;

        let mut events = Vec::new();
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            let event: AuditEvent = serde_json::from_slice(value.value())?;
            if event.resource_type.as_deref() == Some(resource_type)
                && event.resource_id.as_deref() == Some(resource_id)
            {
                events.push(event);
            }
        }
        Ok(events)
    }
}
