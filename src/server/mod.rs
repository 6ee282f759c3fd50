//! HTTP surface of the job submitter.
//!
//! `GET /` and `GET /health` are static and never reach the cluster.
//! `POST /launch` submits one job per call.

mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};
use tracing_error::ExtractSpanTrace;

use self::response::{Health, LaunchResponse, ServiceInfo};
use crate::launcher::{LaunchError, Launcher};
use crate::shutdown::Shutdown;

const SERVICE_NAME: &str = "FastAPI Spark Launcher";
const SERVICE_VERSION: &str = "1.0.0";

#[derive(Clone)]
pub(crate) struct AppState {
    launcher: Arc<Launcher>,
}

pub fn router(launcher: Arc<Launcher>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/launch", post(launch))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { launcher })
}

pub(crate) async fn serve(
    listen: SocketAddr,
    launcher: Arc<Launcher>,
    shutdown: Shutdown,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Spark launcher listening on {}.", listener.local_addr()?);

    axum::serve(listener, router(launcher))
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    info!("Spark launcher stopped.");
    Ok(())
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}

async fn health() -> Json<Health> {
    Json(Health { status: "healthy" })
}

#[instrument("http/launch", skip(state))]
async fn launch(State(state): State<AppState>) -> Result<Json<LaunchResponse>, LaunchError> {
    match state.launcher.launch().await {
        Ok(submission) => Ok(Json(LaunchResponse::from(submission))),
        Err(e) => {
            error!("Failed to launch Spark job: {}", e);
            if let Some(span_trace) = e.span_trace() {
                eprintln!("\n{}\n", color_spantrace::colorize(span_trace));
            }
            Err(e)
        }
    }
}
