// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-address serialization of transfers.
//!
//! Two sweeps from the same wallet would read the same nonce and balance.
//! Holding the address lock across resolve -> broadcast makes them run one
//! after the other within this process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

#[derive(Default)]
pub struct AddressLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AddressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `address` (case-insensitive).
    pub async fn acquire(&self, address: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // Drop idle entries; a held lock is also referenced by its guard
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(address.to_ascii_lowercase())
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
