use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;
use crate::auth::jwt::Claims;
use crate::error::AppError;
use crate::api::AppState;

const TOKEN_COOKIE: &str = "jwt";

/// Axum extractor that validates a session token.
/// Add this as a handler parameter to require authentication.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.auth.authenticate(&token)?;

        Ok(AuthUser(claims))
    }
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let parts = parts_with(header::AUTHORIZATION, "BEARER abc.def.ghi");
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        let parts = parts_with(header::AUTHORIZATION, "Basic dXNlcjpwdw==");
        assert!(bearer_token(&parts).is_none());
        let parts = parts_with(header::AUTHORIZATION, "Bearer ");
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn test_token_read_from_jwt_cookie() {
        let parts = parts_with(header::COOKIE, "theme=dark; jwt=abc.def.ghi");
        assert_eq!(cookie_token(&parts).as_deref(), Some("abc.def.ghi"));
        let parts = parts_with(header::COOKIE, "session=xyz");
        assert!(cookie_token(&parts).is_none());
    }
}
