use std::env;
use std::net::{IpAddr, SocketAddr};

use zeroize::Zeroizing;

use crate::error::{AppError, Result};
use crate::services::token::DEFAULT_VALIDITY_HOURS;

/// Longest accepted session window (one year).
pub const MAX_SESSION_DURATION_HOURS: i64 = 24 * 366;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The single valid username.
    pub username: String,
    /// The configured password hash (Argon2 PHC or hex SHA-256).
    pub password_hash: Zeroizing<String>,
    /// The secret session tokens and CSRF tokens are signed with.
    pub secret_key: Zeroizing<String>,
    /// The passphrase the field encryption key is derived from.
    pub encryption_secret: Zeroizing<String>,
    /// `development` or `production`.
    pub environment: String,
    /// The address the server listens on.
    pub bind_addr: SocketAddr,
    /// Session token validity in hours.
    pub session_duration_hours: i64,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Zeroizing<String>> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(Zeroizing::new(value)),
        _ => Err(AppError::Configuration(format!("{} must be set", key))),
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}: {:?}", key, raw))),
        None => Ok(default),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` for a missing secret or a malformed value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let username = lookup("APP_USERNAME")
            .or_else(|| lookup("USERNAME"))
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "admin".to_string());

        let host: IpAddr = parsed(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parsed(&lookup, "PORT", 8080)?;

        let session_duration_hours: i64 =
            parsed(&lookup, "SESSION_DURATION_HOURS", DEFAULT_VALIDITY_HOURS)?;
        if !(1..=MAX_SESSION_DURATION_HOURS).contains(&session_duration_hours) {
            return Err(AppError::Configuration(format!(
                "SESSION_DURATION_HOURS must be between 1 and {}",
                MAX_SESSION_DURATION_HOURS
            )));
        }

        Ok(Self {
            username,
            password_hash: required(&lookup, "PASSWORD_HASH")?,
            secret_key: required(&lookup, "SECRET_KEY")?,
            encryption_secret: required(&lookup, "ENCRYPTION_SECRET")?,
            environment: lookup("APP_ENV")
                .or_else(|| lookup("ENVIRONMENT"))
                .unwrap_or_else(|| "development".to_string()),
            bind_addr: SocketAddr::new(host, port),
            session_duration_hours,
        })
    }

    /// Whether the service runs in production.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("PASSWORD_HASH", "ab"),
        ("SECRET_KEY", "signing-secret"),
        ("ENCRYPTION_SECRET", "correct-horse"),
    ];

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.username, "admin");
        assert_eq!(config.environment, "development");
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.session_duration_hours, 24);
        assert!(!config.is_production());
    }

    #[test]
    fn reads_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("APP_USERNAME", "alice"),
            ("APP_ENV", "Production"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("SESSION_DURATION_HOURS", "2"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.username, "alice");
        assert!(config.is_production());
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.session_duration_hours, 2);
    }

    #[test]
    fn missing_or_empty_secrets_are_configuration_errors() {
        for skipped in ["PASSWORD_HASH", "SECRET_KEY", "ENCRYPTION_SECRET"] {
            let pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != skipped).collect();
            assert!(matches!(
                Config::from_lookup(lookup(&pairs)),
                Err(AppError::Configuration(msg)) if msg.contains(skipped)
            ));

            let mut blank = pairs.clone();
            blank.push((skipped, "  "));
            assert!(Config::from_lookup(lookup(&blank)).is_err());
        }
    }

    #[test]
    fn accepts_legacy_variable_names() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("USERNAME", "bob"), ("ENVIRONMENT", "production")]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.username, "bob");
        assert!(config.is_production());

        pairs.extend([("APP_USERNAME", "alice"), ("APP_ENV", "development")]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.username, "alice");
        assert!(!config.is_production());
    }

    #[test]
    fn longest_session_window_is_accepted() {
        let max = MAX_SESSION_DURATION_HOURS.to_string();
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_DURATION_HOURS", &max));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.session_duration_hours, MAX_SESSION_DURATION_HOURS);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("SESSION_DURATION_HOURS", "0"),
            ("SESSION_DURATION_HOURS", "9223372036854775807"),
            ("SESSION_DURATION_HOURS", "2000000000000"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            assert!(matches!(
                Config::from_lookup(lookup(&pairs)),
                Err(AppError::Configuration(_))
            ));
        }
    }
}
