use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub exp: i64,
    pub iat: i64,
}

/// HS256 keys derived once from the configured secret. Read-only after
/// construction, so it is shared across requests without locking.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(expiry_hours.saturating_mul(3600)).unwrap_or(i64::MAX),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn generate(&self, subject: &str) -> Result<String, AuthError> {
        self.generate_at(subject, Utc::now().timestamp())
    }

    /// Mints a token as if issued at `issued_at` (unix seconds).
    pub fn generate_at(&self, subject: &str, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: issued_at.saturating_add(self.ttl_secs),
            iat: issued_at,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Signature, expiry and a non-empty subject are all required.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::Unauthorized
        })?;
        // jsonwebtoken still accepts exp == now
        if data.claims.sub.is_empty() || data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Unauthorized);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-for-unit-tests-only-32-chars";

    fn keys() -> TokenKeys {
        TokenKeys::new(TEST_SECRET, 1)
    }

    #[test]
    fn test_generate_and_verify_token() {
        let token = keys().generate("a@b.com").expect("Should generate token");
        assert!(!token.is_empty());

        let claims = keys().verify(&token).expect("Should verify valid token");
        assert_eq!(claims.sub, "a@b.com");
    }

    #[test]
    fn test_verify_wrong_secret_fails() {
        let token = keys().generate("a@b.com").unwrap();
        let other = TokenKeys::new("another-secret-that-is-also-long-enough", 1);
        assert!(matches!(other.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_verify_malformed_token_fails() {
        assert!(keys().verify("not.a.valid.jwt").is_err());
        assert!(keys().verify("").is_err());
    }

    #[test]
    fn test_token_expiry_is_one_hour() {
        let before = Utc::now().timestamp();
        let token = keys().generate("u1").unwrap();
        let after = Utc::now().timestamp();

        let claims = keys().verify(&token).unwrap();
        assert!(claims.exp >= before + 3600, "exp {} too early", claims.exp);
        assert!(claims.exp <= after + 3600, "exp {} too late", claims.exp);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now().timestamp() - 2 * 3600;
        let token = keys().generate_at("u1", issued).unwrap();
        assert!(matches!(keys().verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let issued = Utc::now().timestamp() - 3600;
        let token = keys().generate_at("u1", issued).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let token = keys().generate("").unwrap();
        assert!(matches!(keys().verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_missing_subject_claim_is_rejected() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }
        let token = encode(
            &Header::default(),
            &NoSubject { exp: Utc::now().timestamp() + 600 },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();
        assert!(keys().verify(&token).is_err());
    }
}
