// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet repository on the embedded database.
//!
//! ## Storage Layout
//!
//! ```text
//! wallets:               {wallet_id} -> StoredWallet (JSON)
//! wallet_address_index:  {currency}|{lowercase address} -> wallet_id
//! ```
//!
//! ## Security
//!
//! - Private keys are persisted only as ciphertext (`private_key_secret`)
//! - Encryption happens here on write, decryption here on read
//! - Private keys are NEVER returned via API

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::super::cipher::SecretCipher;
use super::super::database::{WalletDatabase, WALLETS, WALLET_ADDRESS_INDEX};
use super::super::{StoreError, StoreResult};
use crate::blockchain::{derive_address, generate_key, Currency};

/// Default upper bound for a persisted ciphertext.
pub const DEFAULT_MAX_SECRET_LEN: usize = 250;

/// Wallet record as persisted (ciphertext only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWallet {
    /// Unique wallet identifier (UUID)
    pub wallet_id: String,
    /// Currency held by the wallet
    pub currency: Currency,
    /// Public address as created
    pub address: String,
    /// Encrypted private key
    pub private_key_secret: String,
    /// When the wallet was created
    pub created_at: DateTime<Utc>,
}

/// Wallet with its private key decrypted for in-process use.
pub struct Wallet {
    pub id: Uuid,
    pub currency: Currency,
    pub address: String,
    pub created_at: DateTime<Utc>,
    private_key: Zeroizing<String>,
}

impl Wallet {
    /// Plaintext private key. Internal use only (signing).
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("id", &self.id)
            .field("currency", &self.currency)
            .field("address", &self.address)
            .field("created_at", &self.created_at)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Index key enforcing `(address, currency)` uniqueness, case-insensitive.
fn index_key(address: &str, currency: Currency) -> String {
    format!("{}|{}", currency.code(), address.to_ascii_lowercase())
}

/// Repository for wallet operations.
#[derive(Clone)]
pub struct WalletRepository {
    db: WalletDatabase,
    cipher: Arc<dyn SecretCipher>,
    max_secret_len: usize,
}

impl WalletRepository {
    /// Create a new WalletRepository.
    pub fn new(db: WalletDatabase, cipher: Arc<dyn SecretCipher>, max_secret_len: usize) -> Self {
        Self {
            db,
            cipher,
            max_secret_len,
        }
    }

    /// Create and persist a new wallet.
    ///
    /// # Arguments
    /// - `currency`: Currency of the wallet
    /// - `private_key`: Plaintext key; generated when `None`
    /// - `address`: Public address; derived from the key when `None`.
    ///   A supplied address is stored as given.
    ///
    /// # Returns
    /// - `Ok(Wallet)` if successful
    /// - `Err(StoreError::DuplicateWallet)` if `(address, currency)` exists
    pub fn create(
        &self,
        currency: Currency,
        private_key: Option<&str>,
        address: Option<&str>,
    ) -> StoreResult<Wallet> {
        let private_key = match private_key {
            Some(key) => Zeroizing::new(key.to_string()),
            None => generate_key(),
        };
        let address = match address {
            Some(address) => address.to_string(),
            None => derive_address(&private_key)?,
        };

        let private_key_secret = self.cipher.encrypt(&private_key)?;
        if private_key_secret.len() > self.max_secret_len {
            return Err(StoreError::SecretTooLong {
                len: private_key_secret.len(),
                limit: self.max_secret_len,
            });
        }

        let wallet_id = Uuid::new_v4();
        let stored = StoredWallet {
            wallet_id: wallet_id.to_string(),
            currency,
            address: address.clone(),
            private_key_secret,
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec(&stored)?;
        let key = index_key(&address, currency);

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut index = write_txn.open_table(WALLET_ADDRESS_INDEX)?;
            if index.get(key.as_str())?.is_some() {
                return Err(StoreError::DuplicateWallet {
                    address,
                    currency: currency.to_string(),
                });
            }
            index.insert(key.as_str(), stored.wallet_id.as_str())?;

            let mut wallets = write_txn.open_table(WALLETS)?;
            wallets.insert(stored.wallet_id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!(
            wallet_id = %wallet_id,
            address = %address,
            currency = %currency,
            "Wallet created"
        );

        Ok(Wallet {
            id: wallet_id,
            currency,
            address,
            created_at: stored.created_at,
            private_key,
        })
    }

    /// Look up a wallet by address (case-insensitive) and currency.
    pub fn get(&self, address: &str, currency: Currency) -> StoreResult<Option<Wallet>> {
        let read_txn = self.db.inner().begin_read()?;
        let index = read_txn.open_table(WALLET_ADDRESS_INDEX)?;

        let wallet_id = match index.get(index_key(address, currency).as_str())? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let wallets = read_txn.open_table(WALLETS)?;
        match wallets.get(wallet_id.as_str())? {
            Some(value) => {
                let stored: StoredWallet = serde_json::from_slice(value.value())?;
                self.decrypt(stored).map(Some)
            }
            None => Ok(None),
        }
    }

    /// List all wallets, newest first.
    pub fn list(&self) -> StoreResult<Vec<Wallet>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(WALLETS)?;

        let mut stored = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: StoredWallet = serde_json::from_slice(value.value())?;
            stored.push(record);
        }
        stored.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        stored.into_iter().map(|record| self.decrypt(record)).collect()
    }

    /// Read the persisted record without decrypting it.
    #[cfg(test)]
    pub(crate) fn get_stored(&self, wallet_id: &str) -> StoreResult<Option<StoredWallet>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(WALLETS)?;
        match table.get(wallet_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn decrypt(&self, stored: StoredWallet) -> StoreResult<Wallet> {
        let private_key = self.cipher.decrypt(&stored.private_key_secret)?;
        let id = Uuid::parse_str(&stored.wallet_id).map_err(|e| {
            StoreError::Corrupt(format!("wallet id {}: {e}", stored.wallet_id))
        })?;

        Ok(Wallet {
            id,
            currency: stored.currency,
            address: stored.address,
            created_at: stored.created_at,
            private_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::keys::{ADDRESS_HEX_LEN, PRIVATE_KEY_HEX_LEN};
    use crate::storage::cipher::{CipherError, CipherKey, CipherKind, CIPHER_KEY_LEN};

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_repo(dir: &tempfile::TempDir) -> WalletRepository {
        test_repo_with_key(dir, [3u8; CIPHER_KEY_LEN])
    }

    fn test_repo_with_key(dir: &tempfile::TempDir, key: [u8; CIPHER_KEY_LEN]) -> WalletRepository {
        let db = WalletDatabase::open(&dir.path().join("wallets.redb")).unwrap();
        let cipher = CipherKind::Aes256Gcm.build(&CipherKey::new(key)).unwrap();
        WalletRepository::new(db, cipher, DEFAULT_MAX_SECRET_LEN)
    }

    #[test]
    fn create_without_key_or_address_generates_both() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let wallet = repo.create(Currency::Ethereum, None, None).unwrap();

        assert_eq!(wallet.private_key().len(), PRIVATE_KEY_HEX_LEN);
        assert_eq!(wallet.address.len(), ADDRESS_HEX_LEN);
        assert_eq!(derive_address(wallet.private_key()).unwrap(), wallet.address);
    }

    #[test]
    fn create_with_key_derives_address() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let wallet = repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        assert_eq!(wallet.address, DEV_ADDRESS);
        assert_eq!(wallet.private_key(), DEV_KEY);
    }

    #[test]
    fn create_with_key_and_address_stores_as_given() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let address = "0x0000000000000000000000000000000000000001";
        let wallet = repo
            .create(Currency::Ethereum, Some(DEV_KEY), Some(address))
            .unwrap();
        assert_eq!(wallet.address, address);
    }

    #[test]
    fn create_with_invalid_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let result = repo.create(Currency::Ethereum, Some("0x1234"), None);
        assert!(matches!(result, Err(StoreError::Key(_))));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn private_key_is_encrypted_at_rest() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let wallet = repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let stored = repo.get_stored(&wallet.id.to_string()).unwrap().unwrap();

        assert_ne!(stored.private_key_secret, DEV_KEY);
        assert!(!stored.private_key_secret.contains(&DEV_KEY[2..]));
        assert!(stored.private_key_secret.len() <= DEFAULT_MAX_SECRET_LEN);
    }

    #[test]
    fn every_cipher_kind_roundtrips_through_the_repository() {
        for kind in [CipherKind::Aes256Gcm, CipherKind::Fernet] {
            let dir = tempfile::tempdir().unwrap();
            let db = WalletDatabase::open(&dir.path().join("wallets.redb")).unwrap();
            let cipher = kind.build(&CipherKey::new([3u8; CIPHER_KEY_LEN])).unwrap();
            let repo = WalletRepository::new(db, cipher, DEFAULT_MAX_SECRET_LEN);

            let imported = repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
            let generated = repo.create(Currency::Ethereum, None, None).unwrap();

            let stored = repo.get_stored(&imported.id.to_string()).unwrap().unwrap();
            assert!(!stored.private_key_secret.contains(&DEV_KEY[2..]), "{kind}");
            assert!(stored.private_key_secret.len() <= DEFAULT_MAX_SECRET_LEN, "{kind}");

            let loaded = repo.get(DEV_ADDRESS, Currency::Ethereum).unwrap().unwrap();
            assert_eq!(loaded.private_key(), DEV_KEY, "{kind}");

            let listed = repo.list().unwrap();
            assert_eq!(listed.len(), 2, "{kind}");
            let reloaded = listed
                .iter()
                .find(|w| w.address == generated.address)
                .unwrap();
            assert_eq!(reloaded.private_key(), generated.private_key(), "{kind}");
        }
    }

    #[test]
    fn get_decrypts_transparently() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let loaded = repo.get(DEV_ADDRESS, Currency::Ethereum).unwrap().unwrap();

        assert_eq!(loaded.private_key(), DEV_KEY);
        assert_eq!(loaded.address, DEV_ADDRESS);
        assert_eq!(loaded.currency, Currency::Ethereum);
    }

    #[test]
    fn get_is_case_insensitive_on_address() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let lower = DEV_ADDRESS.to_ascii_lowercase();
        assert!(repo.get(&lower, Currency::Ethereum).unwrap().is_some());
    }

    #[test]
    fn get_unknown_wallet_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        assert!(repo.get(DEV_ADDRESS, Currency::Ethereum).unwrap().is_none());
    }

    #[test]
    fn create_duplicate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let result = repo.create(Currency::Ethereum, Some(DEV_KEY), None);
        assert!(matches!(result, Err(StoreError::DuplicateWallet { .. })));

        // Same address in a different case is still a duplicate
        let lower = DEV_ADDRESS.to_ascii_lowercase();
        let result = repo.create(Currency::Ethereum, None, Some(&lower));
        assert!(matches!(result, Err(StoreError::DuplicateWallet { .. })));

        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn list_returns_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let first = repo.create(Currency::Ethereum, None, None).unwrap();
        let second = repo.create(Currency::Ethereum, None, None).unwrap();
        let third = repo.create(Currency::Ethereum, None, None).unwrap();

        let listed: Vec<String> = repo.list().unwrap().into_iter().map(|w| w.address).collect();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0], third.address);
        assert!(listed.contains(&second.address));
        assert_eq!(listed[2], first.address);
    }

    #[test]
    fn ciphertext_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = WalletDatabase::open(&dir.path().join("wallets.redb")).unwrap();
        let cipher = CipherKind::Aes256Gcm
            .build(&CipherKey::new([3u8; CIPHER_KEY_LEN]))
            .unwrap();
        let repo = WalletRepository::new(db, cipher, 100);

        let result = repo.create(Currency::Ethereum, None, None);
        assert!(matches!(
            result,
            Err(StoreError::SecretTooLong { limit: 100, .. })
        ));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_wallet_id_is_an_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let wallet = repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let id = wallet.id.to_string();
        let mut stored = repo.get_stored(&id).unwrap().unwrap();
        stored.wallet_id = "not-a-uuid".to_string();
        let json = serde_json::to_vec(&stored).unwrap();

        let write_txn = repo.db.inner().begin_write().unwrap();
        {
            let mut table = write_txn.open_table(WALLETS).unwrap();
            table.insert(id.as_str(), json.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        let result = repo.get(DEV_ADDRESS, Currency::Ethereum);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
        assert!(matches!(repo.list(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn reading_with_another_cipher_key_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = test_repo_with_key(&dir, [1u8; CIPHER_KEY_LEN]);
            repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        }

        let repo = test_repo_with_key(&dir, [2u8; CIPHER_KEY_LEN]);
        let result = repo.get(DEV_ADDRESS, Currency::Ethereum);
        assert!(matches!(
            result,
            Err(StoreError::Cipher(CipherError::Decryption(_)))
        ));
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(&dir);

        let wallet = repo.create(Currency::Ethereum, Some(DEV_KEY), None).unwrap();
        let debug = format!("{wallet:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&DEV_KEY[2..]));
    }
}
