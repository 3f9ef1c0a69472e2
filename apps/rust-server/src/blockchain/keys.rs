// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Private key generation and Ethereum address derivation.
//!
//! Keys travel through the service as `0x`-prefixed lowercase hex strings
//! (66 characters). Addresses are derived the standard Ethereum way:
//!
//! 1. Parse the secp256k1 secret scalar
//! 2. Get the uncompressed public key (65 bytes: 0x04 || x || y)
//! 3. Take keccak256 of the 64 coordinate bytes
//! 4. Keep the last 20 bytes
//! 5. Encode with the EIP-55 mixed-case checksum (42 characters total)

use alloy::{
    primitives::{keccak256, Address},
    signers::local::PrivateKeySigner,
};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;
use zeroize::Zeroizing;

/// Length of a hex-encoded private key including the `0x` prefix.
pub const PRIVATE_KEY_HEX_LEN: usize = 66;

/// Length of a hex-encoded address including the `0x` prefix.
pub const ADDRESS_HEX_LEN: usize = 42;

/// Errors raised while handling private key material.
///
/// Messages never contain the key itself.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Generate a new random private key.
///
/// # Returns
/// `0x` followed by 64 lowercase hex characters.
pub fn generate_key() -> Zeroizing<String> {
    let signing_key = SigningKey::random(&mut OsRng);
    Zeroizing::new(format!("0x{}", alloy::hex::encode(signing_key.to_bytes())))
}

/// Parse a `0x`-prefixed hex private key into a secp256k1 signing key.
pub fn parse_private_key(private_key: &str) -> Result<SigningKey, KeyError> {
    let hex_part = private_key
        .strip_prefix("0x")
        .ok_or_else(|| KeyError::InvalidKey("missing 0x prefix".to_string()))?;

    if private_key.len() != PRIVATE_KEY_HEX_LEN {
        return Err(KeyError::InvalidKey(format!(
            "expected {PRIVATE_KEY_HEX_LEN} characters, got {}",
            private_key.len()
        )));
    }

    if !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(KeyError::InvalidKey("not valid hex".to_string()));
    }

    let key_bytes = Zeroizing::new(
        alloy::hex::decode_to_array::<_, 32>(hex_part)
            .map_err(|_| KeyError::InvalidKey("not valid hex".to_string()))?,
    );

    // Rejects the zero scalar and values >= the curve order.
    SigningKey::from_slice(key_bytes.as_slice())
        .map_err(|_| KeyError::InvalidKey("not a valid secp256k1 scalar".to_string()))
}

/// Derive the checksummed Ethereum address controlled by `private_key`.
pub fn derive_address(private_key: &str) -> Result<String, KeyError> {
    let signing_key = parse_private_key(private_key)?;
    Ok(address_of(&signing_key).to_checksum(None))
}

/// Build an alloy signer from a `0x`-prefixed hex private key.
pub fn signer_from_key(private_key: &str) -> Result<PrivateKeySigner, KeyError> {
    let signing_key = parse_private_key(private_key)?;
    Ok(PrivateKeySigner::from_signing_key(signing_key))
}

fn address_of(signing_key: &SigningKey) -> Address {
    let public_key_uncompressed = signing_key.verifying_key().to_encoded_point(false);
    let public_key_bytes = public_key_uncompressed.as_bytes();

    // Skip the 0x04 prefix; the address is the last 20 bytes of the hash.
    let hash = keccak256(&public_key_bytes[1..]);
    Address::from_slice(&hash[12..])
}
