//! Request signatures
//!
//! Every call to the mobile API carries a `signature` field: the device
//! identity followed by the current Unix time in milliseconds (15 + 13 = 28
//! ASCII digits), PKCS#7-padded, encrypted with AES-128-CBC under a key
//! derived from the MD5 digest of a passphrase embedded in the app and an
//! all-zero IV, and hex-encoded.
//!
//! Signatures embed the time they were made and must be computed afresh for
//! each request.

use aes::Aes128;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{DateTime, Utc};
use domain::{DomainError, IDENTITY_DIGITS};
use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};

use crate::error::FotocasaError;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Digits in the millisecond timestamp
pub const TIMESTAMP_DIGITS: usize = 13;

/// Length of the plaintext before padding
pub const SIGNATURE_PAYLOAD_LEN: usize = IDENTITY_DIGITS + TIMESTAMP_DIGITS;

/// Fixed AES-128 key and IV
#[derive(Clone)]
pub struct EncryptionKey {
    key: [u8; BLOCK_SIZE],
    iv: [u8; BLOCK_SIZE],
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl EncryptionKey {
    /// Derive the key from a passphrase (MD5 digest), with a zero IV
    #[must_use]
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Md5::digest(passphrase.as_bytes());
        let mut key = [0u8; BLOCK_SIZE];
        key.copy_from_slice(&digest);
        Self {
            key,
            iv: [0u8; BLOCK_SIZE],
        }
    }

    /// Pad and encrypt
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let padded = pkcs7_pad(plaintext, BLOCK_SIZE);
        Aes128CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<NoPadding>(&padded)
    }

    /// Decrypt and strip padding
    ///
    /// # Errors
    ///
    /// Returns an error if the ciphertext is not block-aligned or the
    /// recovered padding is invalid.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, FotocasaError> {
        let padded = Aes128CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|e| FotocasaError::Encryption(e.to_string()))?;
        Ok(pkcs7_unpad(&padded, BLOCK_SIZE)?)
    }
}

/// PKCS#7 padding
///
/// Always appends between 1 and `block_size` bytes, each equal to the pad
/// length; a block-aligned input gains a whole extra block.
#[must_use]
pub fn pkcs7_pad(message: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (message.len() % block_size);
    let mut padded = Vec::with_capacity(message.len() + pad_len);
    padded.extend_from_slice(message);
    // block_size is at most 255 for PKCS#7
    #[allow(clippy::cast_possible_truncation)]
    padded.resize(message.len() + pad_len, pad_len as u8);
    padded
}

/// Strip PKCS#7 padding
///
/// # Errors
///
/// Returns a validation error if the input is empty, not block-aligned, or
/// the trailing bytes are not a valid pad.
pub fn pkcs7_unpad(padded: &[u8], block_size: usize) -> Result<Vec<u8>, DomainError> {
    if padded.is_empty() || padded.len() % block_size != 0 {
        return Err(DomainError::validation("padded length is not block aligned"));
    }
    let pad_len = usize::from(padded[padded.len() - 1]);
    if pad_len == 0 || pad_len > block_size {
        return Err(DomainError::validation("invalid padding length"));
    }
    let (message, padding) = padded.split_at(padded.len() - pad_len);
    if padding.iter().any(|&b| usize::from(b) != pad_len) {
        return Err(DomainError::validation("inconsistent padding bytes"));
    }
    Ok(message.to_vec())
}

/// Unix seconds followed by three zero-padded millisecond digits
#[must_use]
pub fn signature_timestamp(now: DateTime<Utc>) -> String {
    format!("{}{:03}", now.timestamp(), now.timestamp_subsec_millis())
}

/// Plaintext that gets encrypted into a signature
///
/// # Errors
///
/// Returns a validation error if the identity is not 15 digits or the
/// assembled payload is not 28 characters.
pub fn signature_payload(identity: &str, now: DateTime<Utc>) -> Result<String, DomainError> {
    if identity.len() != IDENTITY_DIGITS || !identity.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation("identity length"));
    }
    let payload = format!("{identity}{}", signature_timestamp(now));
    if payload.len() != SIGNATURE_PAYLOAD_LEN {
        return Err(DomainError::validation("payload length"));
    }
    Ok(payload)
}

/// Produces per-request signatures
#[derive(Debug, Clone)]
pub struct RequestSigner {
    key: EncryptionKey,
}

impl RequestSigner {
    /// Create a signer around an existing key
    #[must_use]
    pub const fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Create a signer from the app passphrase
    #[must_use]
    pub fn from_passphrase(passphrase: &SecretString) -> Self {
        Self::new(EncryptionKey::from_passphrase(passphrase.expose_secret()))
    }

    /// Sign for the given instant
    ///
    /// # Errors
    ///
    /// Returns a validation error if the identity or payload length is wrong.
    pub fn sign(&self, identity: &str, now: DateTime<Utc>) -> Result<String, FotocasaError> {
        let payload = signature_payload(identity, now)?;
        Ok(hex::encode(self.key.encrypt(payload.as_bytes())))
    }

    /// Sign for the current instant
    ///
    /// # Errors
    ///
    /// Returns a validation error if the identity is not 15 digits.
    pub fn sign_now(&self, identity: &str) -> Result<String, FotocasaError> {
        self.sign(identity, Utc::now())
    }

    /// Recover the plaintext of a signature
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not hex or does not decrypt cleanly.
    pub fn decrypt_from_hex(&self, signature: &str) -> Result<String, FotocasaError> {
        let bytes = hex::decode(signature)
            .map_err(|e| FotocasaError::Encryption(format!("invalid hex: {e}")))?;
        let plaintext = self.key.decrypt(&bytes)?;
        String::from_utf8(plaintext).map_err(|e| FotocasaError::Encryption(e.to_string()))
    }
}
