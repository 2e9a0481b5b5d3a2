//! Optional API-key enforcement.
//!
//! When `security.api_key` is configured, every route behind this middleware
//! requires a matching `X-API-Key` header. When it is not configured, requests
//! pass through untouched.

use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = &state.config.security.api_key {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        if provided != Some(expected.as_str()) {
            tracing::warn!(uri = %request.uri(), "Rejected request without valid API key");
            return Err(AppError::Unauthorized(anyhow::anyhow!("API key required")));
        }
    }

    Ok(next.run(request).await)
}
