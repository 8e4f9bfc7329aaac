use thiserror::Error;

pub mod jwt;
pub mod password;
pub mod store;

use jwt::{Claims, TokenKeys};
use store::CredentialStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    AlreadyExists,

    /// Same outcome for an unknown email and a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Registration, login and token validation over an owned credential store.
pub struct Authenticator {
    store: CredentialStore,
    keys: TokenKeys,
}

impl Authenticator {
    pub fn new(jwt_secret: &str, jwt_expiry_hours: u64) -> Self {
        Self {
            store: CredentialStore::new(),
            keys: TokenKeys::new(jwt_secret, jwt_expiry_hours),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    pub fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        // Skip the slow hash for an obvious duplicate; insert re-checks atomically.
        if self.store.contains(email) {
            return Err(AuthError::AlreadyExists);
        }
        let hash = password::hash(password)?;
        self.store.insert(email, hash)?;
        tracing::info!(email = %email, "User registered");
        Ok(())
    }

    /// Returns a signed token whose subject is `email`.
    pub fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let stored = self
            .store
            .password_hash(email)
            .ok_or(AuthError::InvalidCredentials)?;
        if !password::verify(password, &stored) {
            return Err(AuthError::InvalidCredentials);
        }
        self.keys.generate(email)
    }

    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TEST_SECRET: &str = "authenticator-test-secret-32-characters";

    fn authenticator() -> Authenticator {
        Authenticator::new(TEST_SECRET, 1)
    }

    #[test]
    fn test_register_twice_conflicts_regardless_of_password() {
        let auth = authenticator();
        auth.register("a@b.com", "pw1").expect("first registration");
        let err = auth.register("a@b.com", "different").unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists));
    }

    #[test]
    fn test_login_returns_token_for_subject() {
        let auth = authenticator();
        auth.register("a@b.com", "pw1").unwrap();

        let token = auth.login("a@b.com", "pw1").expect("login should succeed");
        let claims = auth.authenticate(&token).expect("fresh token is valid");
        assert_eq!(claims.sub, "a@b.com");
    }

    #[test]
    fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let auth = authenticator();
        auth.register("a@b.com", "pw1").unwrap();

        let wrong_pw = auth.login("a@b.com", "nope").unwrap_err();
        let unknown = auth.login("ghost@b.com", "pw1").unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[test]
    fn test_expired_token_fails_authentication() {
        let auth = authenticator();
        let token = auth
            .keys()
            .generate_at("a@b.com", Utc::now().timestamp() - 7200)
            .unwrap();
        assert!(matches!(auth.authenticate(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_token_from_other_instance_is_rejected() {
        let token = Authenticator::new("some-other-secret-of-sufficient-length", 1)
            .keys()
            .generate("a@b.com")
            .unwrap();
        assert!(authenticator().authenticate(&token).is_err());
    }
}
