use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, EncryptionError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// The size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// The smallest decoded envelope: a nonce and the tag of an empty plaintext.
pub const MIN_ENVELOPE_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Derives the envelope key from a configured secret.
///
/// The key is the SHA-256 digest of the secret's UTF-8 bytes, so the same
/// secret always yields the same key.
///
/// # Errors
///
/// Returns `AppError::Configuration` when the secret is empty.
pub fn derive_key(secret: &str) -> Result<SecureKey> {
    if secret.is_empty() {
        return Err(AppError::Configuration(
            "ENCRYPTION_SECRET must be set to a non-empty value".to_string(),
        ));
    }

    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    Ok(SecureKey::new(key))
}

/// Generates a new random AES-GCM nonce.
fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Authenticated encryption of text fields.
///
/// An envelope is `base64(nonce || ciphertext || tag)` with a fresh 12-byte
/// nonce per call and no associated data.
pub struct FieldCipher {
    key: SecureKey,
}

impl FieldCipher {
    /// Creates a cipher keyed from the configured secret.
    pub fn from_secret(secret: &str) -> Result<Self> {
        Ok(Self {
            key: derive_key(secret)?,
        })
    }

    /// Encrypts `plaintext` into a transportable envelope.
    pub fn encrypt(&self, plaintext: &str) -> std::result::Result<String, EncryptionError> {
        let cipher = Aes256Gcm::new(self.key.as_bytes().into());

        let nonce_bytes = generate_nonce();
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::Failure(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(combined))
    }

    /// Opens an envelope produced by [`FieldCipher::encrypt`].
    ///
    /// The tag is verified before any plaintext is returned.
    pub fn decrypt(&self, envelope: &str) -> std::result::Result<String, EncryptionError> {
        let combined = general_purpose::STANDARD
            .decode(envelope)
            .map_err(|e| EncryptionError::InvalidFormat(e.to_string()))?;

        if combined.len() < MIN_ENVELOPE_SIZE {
            return Err(EncryptionError::TooShort {
                len: combined.len(),
                min: MIN_ENVELOPE_SIZE,
            });
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let cipher = Aes256Gcm::new(self.key.as_bytes().into());

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| EncryptionError::TagMismatch)?;

        String::from_utf8(plaintext).map_err(|_| EncryptionError::InvalidUtf8)
    }

    /// Replaces `record[field]` with its envelope.
    ///
    /// Absent, null and empty-string fields are left untouched. Non-string
    /// values are encrypted as their JSON text.
    pub fn encrypt_field(
        &self,
        record: &mut Map<String, Value>,
        field: &str,
    ) -> std::result::Result<(), EncryptionError> {
        let Some(value) = record.get_mut(field) else {
            return Ok(());
        };

        let plaintext = match &*value {
            Value::Null => return Ok(()),
            Value::String(s) if s.is_empty() => return Ok(()),
            Value::String(s) => self.encrypt(s)?,
            other => self.encrypt(&other.to_string())?,
        };

        *value = Value::String(plaintext);
        Ok(())
    }

    /// Replaces the envelope in `record[field]` with its plaintext.
    ///
    /// Absent, null and empty-string fields are left untouched.
    pub fn decrypt_field(
        &self,
        record: &mut Map<String, Value>,
        field: &str,
    ) -> std::result::Result<(), EncryptionError> {
        let Some(value) = record.get_mut(field) else {
            return Ok(());
        };

        let plaintext = match &*value {
            Value::Null => return Ok(()),
            Value::String(s) if s.is_empty() => return Ok(()),
            Value::String(s) => self.decrypt(s)?,
            _ => {
                return Err(EncryptionError::InvalidFormat(format!(
                    "field '{}' is not a string",
                    field
                )));
            }
        };

        *value = Value::String(plaintext);
        Ok(())
    }
}
