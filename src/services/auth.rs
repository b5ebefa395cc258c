use subtle::ConstantTimeEq;

use crate::crypto::password::PasswordDigest;

/// The single username/password pair this deployment accepts.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: PasswordDigest,
}

impl Credentials {
    /// Creates the credential set from configuration.
    pub fn new(username: impl Into<String>, password: PasswordDigest) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// The configured username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Authenticates a login attempt.
    ///
    /// Both checks always run so a wrong username costs as much as a wrong
    /// password.
    ///
    /// # Returns
    ///
    /// `true` only if the username matches exactly and the password verifies.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let username_ok = bool::from(username.as_bytes().ct_eq(self.username.as_bytes()));
        let password_ok = self.password.verify(password);

        if username_ok && password_ok {
            tracing::info!("✅ User authenticated: {}", username);
            true
        } else {
            tracing::warn!("❌ Authentication rejected for username: {}", username);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::password::sha256_hex;

    fn credentials() -> Credentials {
        let digest = PasswordDigest::parse(&sha256_hex("s3cret-pass")).unwrap();
        Credentials::new("admin", digest)
    }

    #[test]
    fn accepts_configured_pair() {
        assert!(credentials().authenticate("admin", "s3cret-pass"));
    }

    #[test]
    fn rejects_every_other_combination() {
        let creds = credentials();
        let cases = [
            ("admin", "wrong"),
            ("admin", ""),
            ("Admin", "s3cret-pass"),
            ("admin ", "s3cret-pass"),
            ("root", "s3cret-pass"),
            ("", ""),
        ];
        for (username, password) in cases {
            assert!(
                !creds.authenticate(username, password),
                "{:?}/{:?} should be rejected",
                username,
                password
            );
        }
    }

    #[test]
    fn exposes_configured_username() {
        assert_eq!(credentials().username(), "admin");
    }
}
