use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// The configured hash of the single account's password.
#[derive(Clone)]
pub enum PasswordDigest {
    /// An Argon2 PHC string, e.g. `$argon2id$v=19$...`.
    Argon2(String),
    /// A raw SHA-256 digest, configured as 64 hex characters.
    Sha256(Zeroizing<[u8; 32]>),
}

impl PasswordDigest {
    /// Parses the `PASSWORD_HASH` setting.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when the value is empty or is neither
    /// a valid Argon2 PHC string nor 64 hex characters.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Configuration(
                "PASSWORD_HASH must be set".to_string(),
            ));
        }

        if value.starts_with("$argon2") {
            PasswordHash::new(value).map_err(|e| {
                AppError::Configuration(format!("PASSWORD_HASH is not a valid Argon2 hash: {}", e))
            })?;
            return Ok(Self::Argon2(value.to_string()));
        }

        let bytes = hex::decode(value).map_err(|_| {
            AppError::Configuration(
                "PASSWORD_HASH must be an Argon2 PHC string or a hex SHA-256 digest".to_string(),
            )
        })?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| {
            AppError::Configuration("PASSWORD_HASH hex digest must be 32 bytes".to_string())
        })?;

        Ok(Self::Sha256(Zeroizing::new(digest)))
    }

    /// Returns `true` if `password` hashes to this digest.
    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Argon2(phc) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(e) => {
                    tracing::error!("❌ Stored Argon2 hash failed to parse: {}", e);
                    false
                }
            },
            Self::Sha256(expected) => {
                let supplied = Sha256::digest(password.as_bytes());
                bool::from(supplied.as_slice().ct_eq(expected.as_slice()))
            }
        }
    }
}

/// Hex SHA-256 of a password, the format accepted by [`PasswordDigest::parse`].
pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};

    fn argon2_hash(password: &str) -> String {
        let salt = SaltString::encode_b64(b"fixed-test-salt!").unwrap();
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn sha256_digest_verifies() {
        let digest = PasswordDigest::parse(&sha256_hex("hunter22")).unwrap();
        assert!(digest.verify("hunter22"));
        assert!(!digest.verify("hunter23"));
        assert!(!digest.verify(""));
    }

    #[test]
    fn argon2_digest_verifies() {
        let digest = PasswordDigest::parse(&argon2_hash("hunter22")).unwrap();
        assert!(matches!(digest, PasswordDigest::Argon2(_)));
        assert!(digest.verify("hunter22"));
        assert!(!digest.verify("Hunter22"));
    }

    #[test]
    fn rejects_unusable_settings() {
        for bad in ["", "   ", "not-hex", "abcd", "$argon2id$v=19$m=19456,t=2,p=1$!!!$???"] {
            assert!(
                matches!(PasswordDigest::parse(bad), Err(AppError::Configuration(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
