use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use crate::api::middleware::auth::AuthUser;
use crate::api::AppState;
use crate::auth::AuthError;
use crate::error::{AppError, AppResult};
use super::decode_body;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl CredentialsRequest {
    fn parse(body: &Bytes) -> AppResult<Self> {
        let req: Self = decode_body(body)?;
        if req.email.is_empty() || req.password.is_empty() {
            return Err(AppError::Validation("email and password are required".to_string()));
        }
        Ok(req)
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req = CredentialsRequest::parse(&body)?;
    run_blocking(move || state.auth.register(&req.email, &req.password)).await?;
    Ok(Json(json!({ "message": "User registered successfully" })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req = CredentialsRequest::parse(&body)?;
    let expires_in = state.auth.keys().ttl_secs();
    let token = run_blocking(move || state.auth.login(&req.email, &req.password)).await?;
    Ok(Json(json!({
        "token": token,
        "expires_in": expires_in,
    })))
}

/// Password hashing is CPU-bound; it runs on the blocking pool.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("auth task failed: {}", e)))?
        .map_err(AppError::from)
}

pub async fn protected(AuthUser(claims): AuthUser) -> String {
    format!("Protected content for user: {}", claims.sub)
}
