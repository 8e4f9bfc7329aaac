//! Preflight handling around `tower_http::cors::CorsLayer`.
//!
//! The CORS layer answers OPTIONS itself with `200`; the outer middleware
//! turns that into `204 No Content`. The inner guard makes sure an OPTIONS
//! request never reaches a handler or the forwarder even if the CORS layer
//! lets one through.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

/// Placed outside the CORS layer.
pub async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_preflight = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_preflight {
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
    }
    response
}

/// Placed inside the CORS layer, directly around the routes.
pub async fn preflight_guard(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        return response;
    }
    next.run(req).await
}
