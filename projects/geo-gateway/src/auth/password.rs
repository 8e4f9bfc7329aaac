use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::AuthError;

/// Salted argon2id hash in PHC string form.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// A stored hash that fails to parse never verifies.
pub fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_correct_password() {
        let h = hash("pw1").expect("Should hash password");
        assert!(verify("pw1", &h), "Correct password should verify");
    }

    #[test]
    fn test_wrong_password_or_corrupt_stored_hash_fails_verification() {
        let h = hash("correct-password").expect("Should hash");
        assert!(!verify("wrong-password", &h));
        assert!(!verify("correct-password", &h[..h.len() / 2]));
        assert!(!verify("correct-password", ""));
    }

    #[test]
    fn test_stored_form_is_argon2id_phc_without_plaintext() {
        let h = hash("plaintext").expect("Should hash");
        assert!(!h.contains("plaintext"));
        let parsed = PasswordHash::new(&h).expect("stored hash should parse as PHC");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(parsed.salt.is_some());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let h1 = hash("same-password").expect("Should hash");
        let h2 = hash("same-password").expect("Should hash");
        assert_ne!(h1, h2);
        assert!(verify("same-password", &h1));
        assert!(verify("same-password", &h2));
    }
}
