// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the storage layout.

use std::path::{Path, PathBuf};

/// Base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the embedded database.
    pub fn db_dir(&self) -> PathBuf {
        self.root.join("db")
    }

    /// Path to the wallet database file.
    pub fn wallet_db(&self) -> PathBuf {
        self.db_dir().join("wallets.redb")
    }
}
