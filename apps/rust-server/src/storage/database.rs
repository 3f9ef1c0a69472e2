// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded wallet database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallets`: wallet_id → serialized StoredWallet (JSON bytes)
//! - `wallet_address_index`: `currency|lowercase_address` → wallet_id
//! - `audit_events`: composite key (timestamp_be|event_id) → serialized AuditEvent

use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};

use super::cipher::CipherError;
use crate::blockchain::KeyError;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: wallet_id → serialized StoredWallet (JSON bytes).
pub(crate) const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

/// Uniqueness index: `currency|lowercase_address` → wallet_id.
pub(crate) const WALLET_ADDRESS_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("wallet_address_index");

/// Audit log: `timestamp_be|event_id` → serialized AuditEvent (JSON bytes).
pub(crate) const AUDIT_EVENTS: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("audit_events");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("wallet {address} ({currency}) already exists")]
    DuplicateWallet { address: String, currency: String },

    /// A persisted record failed an integrity check on read.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The configured cipher produced a ciphertext above the storage bound.
    #[error("encrypted secret is {len} characters, limit is {limit}")]
    SecretTooLong { len: usize, limit: usize },

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// WalletDatabase
// =============================================================================

/// Shared handle to the embedded database file.
#[derive(Clone)]
pub struct WalletDatabase {
    db: Arc<Database>,
}

impl WalletDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(WALLET_ADDRESS_INDEX)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) fn inner(&self) -> &Database {
        &self.db
    }

    /// Verify that a read transaction can be opened on every table.
    pub fn health_check(&self) -> StoreResult<()> {
        use redb::ReadableDatabase;

        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(WALLETS)?;
        let _ = read_txn.open_table(WALLET_ADDRESS_INDEX)?;
        let _ = read_txn.open_table(AUDIT_EVENTS)?;
        Ok(())
    }
}
