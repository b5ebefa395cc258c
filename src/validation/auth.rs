use garde::Validate;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// The request payload for login.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validates a login payload.
///
/// # Returns
///
/// A `Result<()>` carrying every violation in one message.
pub fn validate_login(payload: &LoginRequest) -> Result<()> {
    payload
        .validate()
        .map_err(|report| AppError::Validation(report.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_reasonable_input() {
        assert!(validate_login(&request("admin", "hunter22")).is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_fields() {
        assert!(validate_login(&request("", "hunter22")).is_err());
        assert!(validate_login(&request("admin", "")).is_err());
        assert!(validate_login(&request(&"a".repeat(256), "x")).is_err());
        assert!(validate_login(&request("admin", &"x".repeat(129))).is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", request("admin", "hunter22"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter22"));
    }
}
