//! HTTP API for asking questions about videos.
//!
//! `POST /ask` runs the question-answering pipeline, `GET /health` reports
//! liveness, and the frontend directory is served at `/` and `/static`.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::error::QaError;
use crate::pipeline::{QaRequest, QaService};

const SERVICE_NAME: &str = "youtube-qa-service";

/// Response body of `POST /ask`
#[derive(Debug, Serialize, Deserialize)]
pub struct QaResponse {
    pub video_url: String,
    pub question: String,
    pub answer: String,
    pub context: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error reply with a JSON `detail`; pipeline failures are all 400.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<QaError> for ApiError {
    fn from(err: QaError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

struct AppState {
    service: QaService,
}

/// Build the application router.
pub fn router(service: QaService, frontend_dir: &Path) -> Router {
    let state = Arc::new(AppState { service });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .route_service("/", ServeFile::new(frontend_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(frontend_dir))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run(addr: &str, service: QaService, frontend_dir: &Path) -> eyre::Result<()> {
    let app = router(service, frontend_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QaRequest>, JsonRejection>,
) -> Result<Json<QaResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected /ask body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    info!("POST /ask video_url={}", req.video_url);

    let result = state.service.ask(&req).await.map_err(|e| {
        warn!("Request for {} failed: {e}", req.video_url);
        ApiError::from(e)
    })?;

    Ok(Json(QaResponse {
        video_url: req.video_url,
        question: req.question,
        answer: result.answer,
        context: result.context,
        success: true,
        error: None,
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}
