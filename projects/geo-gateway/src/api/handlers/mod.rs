use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

pub mod address;
pub mod auth;
pub mod health;

/// Decodes a JSON request body regardless of its `Content-Type`.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Malformed JSON body: {}", e)))
}
