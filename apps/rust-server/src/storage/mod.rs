// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Storage Module
//!
//! Persistent storage for custodial wallets, using an embedded redb
//! database under `DATA_DIR`.
//!
//! ## Security Model
//!
//! - Private keys are encrypted with the configured [`SecretCipher`]
//!   before they reach the database
//! - Decryption happens only inside [`WalletRepository`] reads
//! - The cipher key comes from the environment and is never persisted
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   db/
//!     wallets.redb   # wallets, address index, audit events
//! ```

pub mod audit;
pub mod cipher;
pub mod database;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use cipher::{CipherError, CipherKey, CipherKind, SecretCipher};
pub use database::{StoreError, StoreResult, WalletDatabase};
pub use paths::StoragePaths;
pub use repository::{StoredWallet, Wallet, WalletRepository, DEFAULT_MAX_SECRET_LEN};
