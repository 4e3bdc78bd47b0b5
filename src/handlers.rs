//! HTTP route handlers for the AI relay.

use crate::error::AiError;
use crate::models::{AiRequest, AiResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// AI Relay Handler
// ============================================================================

pub async fn ai_explain(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AiRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return AiError::InvalidRequest(rejection.body_text()).into_response(),
    };

    match state.gateway.complete(&request).await {
        Ok(content) => Json(AiResponse { content }).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Health Handler
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    gateway_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        gateway_configured: state.gateway.is_configured(),
    })
}
