//! Client for the external Excel-generation service.

use crate::config::ExcelConfig;
use axum::body::Bytes;
use axum::http::StatusCode;
use service_core::error::AppError;

#[derive(Clone)]
pub struct ExcelClient {
    client: reqwest::Client,
    url: String,
}

impl ExcelClient {
    pub fn new(config: &ExcelConfig) -> Result<Self, AppError> {
        if config.accept_invalid_certs {
            tracing::warn!(url = %config.url, "TLS verification disabled for Excel upstream");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build Excel HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Forward generated content to the Excel upstream and return the
    /// spreadsheet bytes. A non-200 upstream status is passed through with a
    /// generic detail; the upstream body is discarded.
    pub async fn generate(&self, content: &str) -> Result<Bytes, AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "result": content }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Excel upstream request failed");
                AppError::InternalError(anyhow::anyhow!("Failed to generate Excel file"))
            })?;

        if response.status() != reqwest::StatusCode::OK {
            let status = StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            tracing::error!(status = %status, "Excel upstream returned an error status");
            return Err(AppError::Upstream {
                status,
                message: "Failed to generate Excel".to_string(),
            });
        }

        response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read Excel upstream response");
            AppError::InternalError(anyhow::anyhow!("Failed to generate Excel file"))
        })
    }
}
