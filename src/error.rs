use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure modes of the field encryption envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    /// The decoded envelope cannot hold a nonce and a tag.
    #[error("invalid encrypted data: too short ({len} bytes, need at least {min})")]
    TooShort { len: usize, min: usize },

    /// The envelope is not valid base64 (or not a string at all).
    #[error("invalid encrypted data format: {0}")]
    InvalidFormat(String),

    /// AEAD verification failed. No plaintext was released.
    #[error("decryption failed: invalid authentication tag")]
    TagMismatch,

    /// The authenticated plaintext is not UTF-8.
    #[error("decryption failed: plaintext is not valid UTF-8")]
    InvalidUtf8,

    /// The cipher itself failed.
    #[error("encryption failed: {0}")]
    Failure(String),
}

/// Reasons a session token is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("unexpected token type: {0}")]
    WrongType(String),
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required secret or setting is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An encryption failure on data produced by the server.
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// A client supplied an envelope that could not be opened.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(EncryptionError),

    /// A session token failed verification.
    #[error("Invalid session token: {0}")]
    Token(#[from] TokenError),

    /// An authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No session was presented.
    #[error("Not authenticated")]
    Unauthorized,

    /// A CSRF check failed.
    #[error("CSRF validation failed: {0}")]
    Csrf(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The status code and the client-facing message for this error.
    ///
    /// Messages never carry cryptographic detail; that goes to the log only.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Configuration(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::Encryption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Encryption error".to_string(),
            ),
            AppError::InvalidEnvelope(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid encrypted payload".to_string(),
            ),
            AppError::Token(_) | AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Csrf(_) => (StatusCode::FORBIDDEN, "Invalid CSRF token".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            AppError::Encryption(e) => tracing::error!("Encryption error: {}", e),
            AppError::InvalidEnvelope(e) => tracing::warn!("Rejected client envelope: {}", e),
            AppError::Token(e) => tracing::warn!("Session token rejected: {}", e),
            AppError::Authentication(msg) => tracing::warn!("Authentication failed: {}", msg),
            AppError::Unauthorized => tracing::debug!("No session presented"),
            AppError::Csrf(msg) => tracing::warn!("CSRF validation failed: {}", msg),
            AppError::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        let (status, message) = self.status_and_message();

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_envelope_errors_are_bad_requests() {
        let err = AppError::InvalidEnvelope(EncryptionError::TagMismatch);
        assert_eq!(err.status_and_message().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_side_encryption_errors_are_internal() {
        let err: AppError = EncryptionError::Failure("boom".to_string()).into();
        assert_eq!(err.status_and_message().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn token_errors_do_not_leak_the_reason() {
        let err: AppError = TokenError::BadSignature.into();
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Not authenticated");
    }
}
