use serde::{Deserialize, Serialize};

/// The only token type this service issues.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// The username the token was issued to.
    pub sub: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
    /// Token type discriminant, always `"access"` for tokens we issue.
    #[serde(rename = "type")]
    pub token_type: String,
}

/// The caller identity attached to a request once its session token verifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}
