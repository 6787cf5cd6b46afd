//! HTTP query front-end.
//!
//! Serves the latest published state as JSON. Handlers only read from a
//! [`StateReader`], so a request never waits on a running cycle.

use std::future::Future;
use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::pipeline::{DashboardView, Phase, StateReader};

/// Build the router over `reader`.
pub fn router(reader: StateReader) -> Router {
    Router::new()
        .route("/api/data", get(api_data))
        .route("/healthz", get(healthz))
        .with_state(reader)
}

/// Bind `bind` and serve until `shutdown` resolves.
pub async fn serve<S>(bind: &str, reader: StateReader, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| AppError::config(format!("invalid bind address {bind}: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::resource(format!("failed to bind {addr}: {e}")))?;

    log::info!("Dashboard listening on http://{addr}");
    axum::serve(listener, router(reader))
        .with_graceful_shutdown(shutdown)
        .await?;
    log::info!("Dashboard stopped");
    Ok(())
}

async fn api_data(State(reader): State<StateReader>) -> Json<DashboardView> {
    Json(reader.view())
}

#[derive(Debug, Serialize)]
struct Health {
    phase: Phase,
    is_scraping: bool,
    has_data: bool,
}

async fn healthz(State(reader): State<StateReader>) -> (StatusCode, Json<Health>) {
    let state = reader.current();
    let status = if state.phase == Phase::Stopped {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(Health {
            phase: state.phase,
            is_scraping: state.busy,
            has_data: state.last_updated.is_some(),
        }),
    )
}
