use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::geo::{DadataClient, GeoProvider};
use proxy::ReverseProxy;

pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod router;

pub struct AppState {
    pub auth: Authenticator,
    pub geo: Arc<dyn GeoProvider>,
    pub proxy: ReverseProxy,
}

impl AppState {
    /// Builds every long-lived collaborator once. Fails on unusable
    /// configuration before anything binds.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            auth: Authenticator::new(&cfg.auth.jwt_secret, cfg.auth.jwt_expiry_hours),
            geo: Arc::new(DadataClient::new(&cfg.provider)?),
            proxy: ReverseProxy::new(&cfg.proxy.target())?,
        })
    }
}

pub async fn serve(cfg: Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(&cfg)?);
    let cors = build_cors_layer(&cfg.api.cors_allowed_origins);
    let app = build_app(state, cors);

    let bind_addr = format!("{}:{}", cfg.api.bind, cfg.api.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Gateway listening on http://{}", bind_addr);

    run(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(cfg.api.shutdown_grace_secs),
    )
    .await
}

/// Serves `app` until `shutdown` resolves, then waits up to `grace` for
/// in-flight requests. Connections still open at the deadline are an error.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => {
            joined??;
            return Ok(());
        }
        () = shutdown => {}
    }

    tracing::info!("Shutdown requested, draining connections for up to {:?}", grace);
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => {
            joined??;
            tracing::info!("Server stopped");
            Ok(())
        }
        Err(_) => {
            server.abort();
            anyhow::bail!(
                "graceful shutdown timed out after {:?} with connections still open",
                grace
            )
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

pub fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured; CORS will block all cross-origin requests");
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn build_app(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .merge(router::routes(state))
        .layer(axum::middleware::from_fn(middleware::cors::preflight_guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::cors::preflight_no_content))
}
