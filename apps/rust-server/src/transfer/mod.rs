// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sweep transfers from custodial wallets.

pub mod error;
pub mod locks;
pub mod policy;
pub mod quote;
pub mod service;

pub use error::{FieldErrors, TransferError};
pub use policy::{SweepPolicy, TransferSettings};
pub use service::{validate_request, TransferReceipt, TransferService, ValidatedTransfer};
