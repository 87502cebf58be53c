//! Axum web front end: an HTML form plus a JSON API over the generation
//! pipeline. Every route runs behind a 64 KiB body limit and a request
//! timeout.

mod handlers;
mod page;

use handlers::{handle_api_generate, handle_form_generate, handle_health, handle_index, handle_status};

use crate::config::Config;
use crate::pipeline::GenerationPipeline;
use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub config: Arc<Config>,
}

fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Routes and layers, without binding. Integration tests drive this directly.
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.gateway.request_timeout_secs.max(1));
    Router::new()
        .route("/", get(handle_index))
        .route("/generate", post(handle_form_generate))
        .route("/api/generate", post(handle_api_generate))
        .route("/api/status", get(handle_status))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
}

/// Bind `host:port` and serve until the process exits.
pub async fn run_gateway(
    host: &str,
    port: u16,
    config: Arc<Config>,
    pipeline: Arc<GenerationPipeline>,
) -> Result<()> {
    // ── Refuse public bind without explicit opt-in ──
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!("{}", t!("gateway.public_bind_refused", host = host));
    }

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(host, listener, config, pipeline).await
}

/// Serve from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
    pipeline: Arc<GenerationPipeline>,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let display_addr = format!("{host}:{actual_port}");

    println!("◆ {}", t!("gateway.listening", addr = display_addr));
    println!("  GET  /              → {}", t!("gateway.route_form"));
    println!("  POST /api/generate  → {}", t!("gateway.route_api"));
    println!("  GET  /health        → {}", t!("gateway.route_health"));
    match pipeline.backend() {
        Some(backend) => println!(
            "  ✓ {}",
            t!("gateway.backend", kind = backend.kind(), model = backend.model())
        ),
        None => println!("  ! {}", t!("gateway.no_backend")),
    }
    println!("  {}\n", t!("gateway.stop_hint"));

    tracing::info!(addr = %display_addr, "gateway started");
    let app = router(AppState { pipeline, config });
    axum::serve(listener, app).await?;

    Ok(())
}
