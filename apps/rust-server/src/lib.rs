// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody Server - Custodial Ethereum Wallet Service
//!
//! Stores private keys encrypted at rest, derives addresses, and sweeps the
//! whole balance of a custodial wallet to a destination address.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Key handling and Ethereum JSON-RPC integration
//! - `storage` - Encrypted wallet storage (redb)
//! - `transfer` - Sweep transfer orchestration

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod transfer;
