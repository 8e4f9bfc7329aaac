use axum::{routing::{any, get, post}, Router};
use std::sync::Arc;
use super::AppState;
use super::handlers;
use super::proxy;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health (public)
        .route("/health-check", get(handlers::health::health_check))
        // Auth (public)
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // Protected
        .route("/protected", get(handlers::auth::protected))
        // Address lookup (public)
        .route("/api/address/search", post(handlers::address::search))
        .route("/api/address/geocode", post(handlers::address::geocode))
        // Everything else under /api/ goes to the origin
        .route("/api/", any(proxy::forward))
        .route("/api/{*path}", any(proxy::forward))
        .with_state(state)
}
