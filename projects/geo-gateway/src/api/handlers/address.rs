//! Address lookup endpoints.
//!
//!   POST /api/address/search   {"query": "..."}
//!   POST /api/address/geocode  {"lat": "...", "lng": "..."}
//!
//! Both answer `{"addresses": [...]}`; an empty list is a normal result.
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::geo::AddressRecord;
use super::decode_body;

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lng: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub addresses: Vec<AddressRecord>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<AddressResponse>> {
    let req: SearchRequest = decode_body(&body)?;
    if req.query.is_empty() {
        return Err(AppError::Validation("query is required".to_string()));
    }

    tracing::info!(query = %req.query, "Address search");
    let addresses = state.geo.search_by_text(&req.query).await?;
    tracing::debug!(count = addresses.len(), "Address search answered");

    Ok(Json(AddressResponse { addresses }))
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<AddressResponse>> {
    let req: GeocodeRequest = decode_body(&body)?;
    if req.lat.is_empty() || req.lng.is_empty() {
        return Err(AppError::Validation("lat and lng are required".to_string()));
    }

    tracing::info!(lat = %req.lat, lng = %req.lng, "Reverse geocode");
    let addresses = state.geo.reverse_geocode(&req.lat, &req.lng).await?;
    tracing::debug!(count = addresses.len(), "Reverse geocode answered");

    Ok(Json(AddressResponse { addresses }))
}
