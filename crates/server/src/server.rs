//! Router assembly and process lifecycle

use crate::config::ServerConfig;
use crate::middleware::{log_requests, ml_token_auth, request_id};
use crate::routes::{api_info, health, not_found, predict, scan};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// `/`, `/health` and `/ready` are public. `/scan` and `/api/v1/predict`
/// need the `ml-token` header and are bounded by the body size limit.
///
/// Outermost first: tracing, request id, request log, CORS, compression,
/// timeout.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .merge(prediction_routes(state.clone()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_id))
                .layer(from_fn(log_requests))
                .layer(cors_layer(&config))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.timeout(),
                )),
        )
        .with_state(state)
}

fn prediction_routes(state: Arc<ServerState>) -> Router<Arc<ServerState>> {
    let body_limit = state.config.max_body_size();
    Router::new()
        .route("/scan", post(scan::scan))
        .route("/api/v1/predict", post(predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(state, ml_token_auth))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.http.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    }
}

fn init_tracing(config: &ServerConfig) {
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .try_init();
}

/// Start the DendroScan HTTP server
///
/// Builds the prediction pipeline (prompt embeddings included) before
/// binding, then serves until SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);

    let addr = config.socket_addr()?;
    let state = Arc::new(ServerState::new(config.clone()).await?);
    let info = state.pipeline.describe();

    tracing::info!(
        %addr,
        classifier = %info.classifier,
        detector = %info.detector,
        store = %info.store,
        vocabularies = info.vocabularies.len(),
        concurrency = info.concurrency,
        timeout_secs = config.http.timeout_secs,
        max_body_mb = config.http.max_body_size_mb,
        ml_token = config.auth.ml_token.is_some(),
        "DendroScan server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    };
    tracing::info!(signal, "Shutting down");
}
