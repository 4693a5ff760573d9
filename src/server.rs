//! Webhook HTTP server.
//!
//! Exposes the provider verification handshake and the event intake on one
//! path, plus a liveness probe.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::whatsapp::router::Dispatcher;

/// Default webhook path.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhooks/whatsapp";

/// State shared by the webhook handlers.
pub struct AppState {
    /// Secret expected in `hub.verify_token`.
    pub verify_token: String,
    /// Handles posted events.
    pub dispatcher: Dispatcher,
}

#[derive(Deserialize)]
struct VerifyQs {
    #[serde(rename = "hub.verify_token")]
    token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Build the webhook router serving `webhook_path` and `/healthz`.
pub fn router(state: Arc<AppState>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, get(verify).post(receive))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn verify(State(state): State<Arc<AppState>>, Query(q): Query<VerifyQs>) -> impl IntoResponse {
    if !state.verify_token.is_empty() && q.token.as_deref() == Some(state.verify_token.as_str()) {
        (StatusCode::OK, q.challenge.unwrap_or_default())
    } else {
        warn!("webhook verification with invalid token");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid verify token".to_owned(),
        )
    }
}

async fn receive(State(state): State<Arc<AppState>>, Json(envelope): Json<Value>) -> impl IntoResponse {
    match state.dispatcher.handle(envelope).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            error!(error = %e, "failed to deliver replies");
            (StatusCode::INTERNAL_SERVER_ERROR, "delivery failed")
        }
    }
}

async fn healthz() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
