use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::{
    error::{AppError, Result, TokenError},
    models::session::{Claims, ACCESS_TOKEN_TYPE},
};

/// Default session validity window.
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Issues and verifies HS256 session tokens for the configured user.
///
/// Stateless: nothing is stored, expiry is the only server-side invalidation.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the signing secret.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when the secret is empty.
    pub fn new(secret: &[u8], validity: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(AppError::Configuration(
                "SECRET_KEY must be set to a non-empty value".to_string(),
            ));
        }

        // Expiry is checked against an explicit clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            validity,
        })
    }

    /// The validity window applied by [`TokenIssuer::issue`].
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a token for `username` with the configured validity.
    pub fn issue(&self, username: &str) -> Result<String> {
        self.issue_at(username, Utc::now(), self.validity)
    }

    /// Issues a token for `username` valid for `validity` from now.
    pub fn issue_for(&self, username: &str, validity: Duration) -> Result<String> {
        self.issue_at(username, Utc::now(), validity)
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Result<String> {
        let expires_at = now.checked_add_signed(validity).ok_or_else(|| {
            AppError::Internal(format!("Token expiry overflows: now + {}", validity))
        })?;

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Verifies `token` against the current time and returns its subject.
    pub fn verify(&self, token: &str) -> std::result::Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// Every input yields either the subject or a `TokenError`.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<String, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::WrongType(claims.token_type));
        }

        Ok(claims.sub)
    }
}
