//! Axum-based HTTP gateway with body limits, request timeouts and bearer auth.

mod auth;
mod handlers;

pub use auth::BearerAuth;

use crate::app::services::Services;
use crate::config::{Config, is_public_bind};
use crate::diagnostics::health::{self, GATEWAY_COMPONENT};
use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    http::StatusCode,
    routing::{get, post, put},
};
use handlers::{
    handle_conversations, handle_delete_history, handle_health, handle_load_profile,
    handle_navigate, handle_save_profile, handle_send_message,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (150s)
pub const REQUEST_TIMEOUT_SECS: u64 = 150;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub auth: Arc<BearerAuth>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/messages", post(handle_send_message))
        .route("/api/conversations/{user}", get(handle_conversations))
        .route("/api/history/delete", post(handle_delete_history))
        .route("/api/profile", put(handle_save_profile))
        .route("/api/profile/{user}", get(handle_load_profile))
        .route("/api/navigate", get(handle_navigate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(handle_health))
        .merge(api)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from other machines.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml together with bearer_tokens."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid gateway address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind gateway to {addr}"))?;

    run_gateway_with_listener(host, listener, config).await
}

/// Serve from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let services = Arc::new(Services::build(&config).await?);
    serve(host, listener, services, &config).await
}

/// Serve with already-built services.
pub async fn serve(
    host: &str,
    listener: tokio::net::TcpListener,
    services: Arc<Services>,
    config: &Config,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let auth = Arc::new(BearerAuth::new(&config.gateway.bearer_tokens));

    if let Err(error) = services.provider.warmup().await {
        tracing::warn!(%error, "model provider warmup failed");
    }

    println!("◆ MentalCare gateway listening on http://{host}:{actual_port}");
    println!("  GET  /health");
    println!("  POST /api/messages");
    println!("  GET  /api/conversations/{{user}}");
    println!("  POST /api/history/delete");
    println!("  GET  /api/profile/{{user}}   PUT /api/profile");
    println!("  GET  /api/navigate?path=..");
    if auth.is_enabled() {
        println!("  ✓ bearer token required for /api routes");
    } else {
        println!("  ! no bearer_tokens configured; /api routes are open");
    }
    println!("  Press Ctrl+C to stop.\n");

    health::mark_component_ok(GATEWAY_COMPONENT);

    let app = router(AppState { services, auth });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
