//! HTTP surface of the engine.
//!
//! - `GET /health` - liveness probe
//! - `POST /chat` - one guarded chat turn

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use validator::Validate;

use crate::error::AppError;
use crate::models::{ChatRequest, ChatResponse};
use crate::orchestrator::ChatOrchestrator;
use crate::rate_limiter::RateLimiter;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub limiter: Arc<Mutex<RateLimiter>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("fy-engine listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok", "service": "fy-engine"}))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    request
        .validate()
        .map_err(|e| error_response(AppError::from(e)))?;

    let allowed = state.limiter.lock().await.check(&request.user_id);
    if !allowed {
        return Err(error_response(AppError::RateLimited));
    }

    match state.orchestrator.process(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(error_response(err)),
    }
}

/// Map an internal error to a bounded, on-brand HTTP response. Raw error
/// detail stays in the logs.
fn error_response(err: AppError) -> (StatusCode, Json<Value>) {
    let (status, message) = match &err {
        AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AppError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Demasiadas peticiones seguidas, dame un momento.".to_string(),
        ),
        _ => {
            error!(error = %err, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ups, algo ha fallado por mi parte. Inténtalo de nuevo en un momento.".to_string(),
            )
        }
    };
    (status, Json(json!({"error": message})))
}
