// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric encryption of wallet private keys at rest.
//!
//! The cipher is chosen once at startup from [`CipherKind`] and shared by
//! the wallet repository, which encrypts on write and decrypts on read.
//!
//! # Wire formats
//!
//! AES-256-GCM:
//! ```text
//! base64( nonce (12 bytes) || ciphertext || auth_tag (16 bytes) )
//! ```
//!
//! Fernet (AES-128-CBC + HMAC-SHA256 tokens): the 32-byte key is used as
//! the url-safe base64 Fernet key, so secrets written by other Fernet
//! implementations with the same key can be read back.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64ct::{Base64, Base64Url, Encoding};
use fernet::Fernet;
use zeroize::Zeroizing;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Length of the process-wide cipher key in bytes.
pub const CIPHER_KEY_LEN: usize = 32;

/// Errors raised by [`SecretCipher`] implementations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CipherError {
    /// Input rejected before encryption.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Ciphertext was not produced by the configured key and algorithm.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The configured cipher key is unusable.
    #[error("Invalid cipher key: {0}")]
    InvalidKey(String),

    /// Unknown cipher name in configuration.
    #[error("Unknown cipher `{0}`")]
    UnknownCipher(String),
}

/// Reversible encryption of a secret string.
///
/// For every valid plaintext `x`, `decrypt(encrypt(x)) == x`.
pub trait SecretCipher: Send + Sync {
    /// Encrypt a non-empty plaintext.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt a ciphertext previously produced by [`SecretCipher::encrypt`].
    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>, CipherError>;
}

/// Registry of available cipher algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    Aes256Gcm,
    Fernet,
}

impl CipherKind {
    /// Configuration name of this cipher.
    pub fn name(&self) -> &'static str {
        match self {
            CipherKind::Aes256Gcm => "aes-256-gcm",
            CipherKind::Fernet => "fernet",
        }
    }

    /// Instantiate the cipher with the process-wide key.
    pub fn build(self, key: &CipherKey) -> Result<Arc<dyn SecretCipher>, CipherError> {
        Ok(match self {
            CipherKind::Aes256Gcm => Arc::new(Aes256GcmCipher::new(key)),
            CipherKind::Fernet => Arc::new(FernetCipher::new(key)?),
        })
    }
}

impl Default for CipherKind {
    fn default() -> Self {
        Self::Aes256Gcm
    }
}

impl fmt::Display for CipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherKind {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-256-gcm" | "aes256gcm" => Ok(CipherKind::Aes256Gcm),
            "fernet" => Ok(CipherKind::Fernet),
            other => Err(CipherError::UnknownCipher(other.to_string())),
        }
    }
}

/// Process-wide 256-bit cipher key, wiped from memory on drop.
#[derive(Clone)]
pub struct CipherKey(Zeroizing<[u8; CIPHER_KEY_LEN]>);

impl CipherKey {
    pub fn new(bytes: [u8; CIPHER_KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Decode a padded base64 32-byte key, standard or url-safe alphabet.
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let encoded = encoded.trim();
        let decoded = Zeroizing::new(
            Base64::decode_vec(encoded)
                .or_else(|_| Base64Url::decode_vec(encoded))
                .map_err(|_| CipherError::InvalidKey("not valid base64".to_string()))?,
        );

        let bytes: [u8; CIPHER_KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            CipherError::InvalidKey(format!(
                "expected {CIPHER_KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;

        Ok(Self::new(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(<redacted>)")
    }
}

/// AES-256-GCM with a random 96-bit nonce per encryption.
pub struct Aes256GcmCipher {
    cipher: Aes256Gcm,
}

impl Aes256GcmCipher {
    pub fn new(key: &CipherKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_bytes().into()),
        }
    }
}

fn ensure_not_empty(plaintext: &str) -> Result<(), CipherError> {
    if plaintext.is_empty() {
        return Err(CipherError::Validation(
            "cannot encrypt an empty secret".to_string(),
        ));
    }
    Ok(())
}

fn utf8_secret(plaintext: &[u8]) -> Result<Zeroizing<String>, CipherError> {
    let text = std::str::from_utf8(plaintext)
        .map_err(|_| CipherError::Decryption("plaintext is not UTF-8".to_string()))?;
    Ok(Zeroizing::new(text.to_string()))
}

impl SecretCipher for Aes256GcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        ensure_not_empty(plaintext)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Validation("encryption failed".to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);
        Ok(Base64::encode_string(&payload))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>, CipherError> {
        let payload = Base64::decode_vec(ciphertext)
            .map_err(|_| CipherError::Decryption("ciphertext is not valid base64".to_string()))?;

        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Decryption(format!(
                "ciphertext too short: {} < {}",
                payload.len(),
                NONCE_LEN + TAG_LEN
            )));
        }

        let (nonce_bytes, sealed) = payload.split_at(NONCE_LEN);
        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(nonce_bytes), sealed)
                .map_err(|_| {
                    CipherError::Decryption("authentication tag mismatch".to_string())
                })?,
        );

        utf8_secret(&plaintext)
    }
}

/// Fernet tokens keyed with the process-wide key.
pub struct FernetCipher {
    fernet: Fernet,
}

impl FernetCipher {
    pub fn new(key: &CipherKey) -> Result<Self, CipherError> {
        let encoded = Zeroizing::new(Base64Url::encode_string(key.as_bytes()));
        let fernet = Fernet::new(&encoded)
            .ok_or_else(|| CipherError::InvalidKey("rejected as a Fernet key".to_string()))?;
        Ok(Self { fernet })
    }
}

impl SecretCipher for FernetCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        ensure_not_empty(plaintext)?;
        Ok(self.fernet.encrypt(plaintext.as_bytes()))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>, CipherError> {
        let plaintext = Zeroizing::new(self.fernet.decrypt(ciphertext).map_err(|_| {
            CipherError::Decryption("invalid or tampered Fernet token".to_string())
        })?);
        utf8_secret(&plaintext)
    }
}
