// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::ChainClient;
use crate::storage::{AuditRepository, WalletDatabase, WalletRepository};
use crate::transfer::{TransferService, TransferSettings};

#[derive(Clone)]
pub struct AppState {
    pub db: WalletDatabase,
    pub wallets: WalletRepository,
    pub audit: AuditRepository,
    pub transfers: Arc<TransferService>,
}

impl AppState {
    /// Wire repositories and the transfer service around one database.
    pub fn new(
        db: WalletDatabase,
        wallets: WalletRepository,
        chain: Arc<dyn ChainClient>,
        settings: TransferSettings,
    ) -> Self {
        let transfers = Arc::new(TransferService::new(wallets.clone(), chain, settings));
        Self {
            audit: AuditRepository::new(db.clone()),
            db,
            wallets,
            transfers,
        }
    }
}
