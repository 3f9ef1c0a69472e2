// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the wallet database.
//!
//! Repositories own the mapping between domain records and their stored
//! form, including encryption of secrets at the storage boundary.

pub mod wallets;

pub use wallets::{StoredWallet, Wallet, WalletRepository, DEFAULT_MAX_SECRET_LEN};
