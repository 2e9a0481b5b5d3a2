use crate::dtos::LanguageMode;
use crate::services::images::{encode_upload, EncodedImage};
use crate::services::prompt::build_prompt;
use crate::services::providers::{ChatProvider, CompletionRequest};
use crate::sse;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::Response,
};
use futures::StreamExt;
use service_core::error::AppError;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// `POST /api/generate-test-cases`
///
/// Multipart form: `images` (one or more files, required), `language_mode`
/// (`gherkin`|`traditional`, required), `additional_info` (optional).
///
/// Input errors are reported as real 4xx responses. Once the event stream has
/// begun, the status is committed: provider failures surface as one in-band
/// `Error: ...` frame, and every stream ends with a single `[DONE]` frame.
pub async fn generate_test_cases(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut images: Vec<EncodedImage> = Vec::new();
    let mut language_mode: Option<LanguageMode> = None;
    let mut additional_info: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!(file = %file_name, error = %e, "Failed to read uploaded image");
                    AppError::BadRequest(anyhow::anyhow!(
                        "Error processing image {}: {}",
                        file_name,
                        e
                    ))
                })?;
                images.push(encode_upload(&file_name, &data));
            }
            "language_mode" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read language_mode: {}", e))
                })?;
                language_mode = Some(
                    value
                        .parse()
                        .map_err(|e: String| AppError::BadRequest(anyhow::anyhow!(e)))?,
                );
            }
            "additional_info" => {
                additional_info = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read additional_info: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let mode = language_mode
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("language_mode is required")))?;
    if images.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "At least one image is required"
        )));
    }

    tracing::info!(
        mode = %mode,
        image_count = images.len(),
        "Generating test cases"
    );

    let request = CompletionRequest {
        prompt: build_prompt(mode, additional_info.as_deref()),
        images,
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    let provider = state.provider.clone();
    tokio::spawn(async move {
        relay_completion(provider, request, tx).await;
    });

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))
}

/// Forward provider deltas as event-stream frames.
///
/// Always emits exactly one terminal frame. A failed send means the client
/// disconnected; returning drops the provider stream and with it the upstream
/// call.
async fn relay_completion(
    provider: Arc<dyn ChatProvider>,
    request: CompletionRequest,
    tx: mpsc::Sender<String>,
) {
    match provider.stream_completion(request).await {
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(delta) => {
                        if tx.send(sse::frame(&delta)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Provider stream failed mid-flight");
                        let _ = tx.send(sse::frame(&format!("Error: {}", e))).await;
                        break;
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Provider call failed");
            let _ = tx.send(sse::frame(&format!("Error: {}", e))).await;
        }
    }

    let _ = tx.send(sse::DONE_FRAME.to_string()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{CompletionStream, ProviderError};
    use async_trait::async_trait;

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        async fn stream_completion(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionStream, ProviderError> {
            Err(ProviderError::NetworkError("connection refused".to_string()))
        }
    }

    struct MidStreamFailureProvider;

    #[async_trait]
    impl ChatProvider for MidStreamFailureProvider {
        async fn stream_completion(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionStream, ProviderError> {
            let items: Vec<Result<String, ProviderError>> = vec![
                Ok("partial".to_string()),
                Err(ProviderError::NetworkError("reset".to_string())),
            ];
            Ok(Box::pin(tokio_stream::iter(items)))
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            prompt: "p".to_string(),
            images: vec![],
        }
    }

    async fn collect_frames(provider: Arc<dyn ChatProvider>) -> Vec<String> {
        let (tx, mut rx) = mpsc::channel(32);
        relay_completion(provider, request(), tx).await;

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn failed_call_yields_error_frame_then_done() {
        let frames = collect_frames(Arc::new(FailingProvider)).await;
        assert_eq!(frames.len(), 2);
        assert!(frames[0].starts_with("data: Error: "));
        assert_eq!(frames[1], sse::DONE_FRAME);
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_delivered_deltas() {
        let frames = collect_frames(Arc::new(MidStreamFailureProvider)).await;
        assert_eq!(frames[0], "data: partial\n\n");
        assert!(frames[1].starts_with("data: Error: "));
        assert_eq!(frames.last().map(String::as_str), Some(sse::DONE_FRAME));
    }

    #[tokio::test]
    async fn done_frame_is_always_last_and_unique() {
        let frames =
            collect_frames(Arc::new(crate::services::providers::mock::MockChatProvider::new()))
                .await;
        let done_count = frames
            .iter()
            .filter(|f| f.as_str() == sse::DONE_FRAME)
            .count();
        assert_eq!(done_count, 1);
        assert_eq!(frames.last().map(String::as_str), Some(sse::DONE_FRAME));
    }
}
