//! HTTP surface of the job registry.
//!
//! | Method | Path                | Success                               |
//! |--------|---------------------|---------------------------------------|
//! | POST   | `/jobs`             | 201 `{"job_id": "..."}`               |
//! | GET    | `/status/{job_id}`  | 200 `{"result": "pending"}` or 404    |
//! | GET    | `/health`           | 200 `{"status": "ok", ...}`           |

mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

pub use error::{ApiError, ApiResult};

use crate::registry::JobRegistry;
use crate::state_machine::JobId;
use crate::wire::{CreateJobResponse, HealthResponse, StatusResponse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
}

async fn create_job(State(state): State<AppState>) -> (StatusCode, Json<CreateJobResponse>) {
    let job_id = state.registry.create_job();
    (StatusCode::CREATED, Json(CreateJobResponse { job_id }))
}

async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let result = state.registry.get_status(&JobId::from(job_id))?;
    Ok(Json(StatusResponse { result }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs: state.registry.len(),
    })
}

/// Build the application router with request tracing.
pub fn router(registry: Arc<JobRegistry>) -> Router {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/status/{job_id}", get(get_status))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(AppState { registry })
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn serve(
    host: &str,
    port: u16,
    registry: Arc<JobRegistry>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    serve_on(listener, registry, shutdown).await
}

/// Serve on an already-bound listener (lets callers bind port 0).
pub async fn serve_on(
    listener: TcpListener,
    registry: Arc<JobRegistry>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let local = listener.local_addr()?;
    let config = registry.config();
    info!(
        addr = %local,
        min_delay_secs = config.min_delay.as_secs_f64(),
        max_delay_secs = config.max_delay.as_secs_f64(),
        error_rate = config.error_rate,
        policy = %config.policy,
        "Job server listening"
    );

    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("Job server stopped");
    Ok(())
}
