use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::crypto::envelope::FieldCipher;
use crate::crypto::password::PasswordDigest;
use crate::error::{AppError, Result};
use crate::services::auth::Credentials;
use crate::services::token::TokenIssuer;

/// The application's state.
///
/// Built once at startup and never mutated; cloned cheaply into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// The single accepted credential.
    pub credentials: Arc<Credentials>,
    /// Session token issuer/verifier.
    pub tokens: Arc<TokenIssuer>,
    /// Field encryption envelope.
    pub cipher: Arc<FieldCipher>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Errors
    ///
    /// Fails with `AppError::Configuration` if any secret is unusable, so the
    /// process never serves traffic half-configured.
    pub fn new(config: &Config) -> Result<Self> {
        let password = PasswordDigest::parse(&config.password_hash)?;
        let credentials = Credentials::new(config.username.clone(), password);
        tracing::info!("✅ Credentials loaded for user: {}", credentials.username());

        let validity = Duration::try_hours(config.session_duration_hours).ok_or_else(|| {
            AppError::Configuration(format!(
                "SESSION_DURATION_HOURS out of range: {}",
                config.session_duration_hours
            ))
        })?;
        let tokens = TokenIssuer::new(config.secret_key.as_bytes(), validity)?;
        tracing::info!(
            "✅ Token issuer initialized ({}h sessions)",
            config.session_duration_hours
        );

        let cipher = FieldCipher::from_secret(&config.encryption_secret)?;
        tracing::info!("✅ Field cipher initialized");

        Ok(AppState {
            config: Arc::new(config.clone()),
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
            cipher: Arc::new(cipher),
        })
    }

    /// The secret CSRF tokens are bound with.
    pub fn csrf_secret(&self) -> &[u8] {
        self.config.secret_key.as_bytes()
    }
}
