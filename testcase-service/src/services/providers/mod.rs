//! Chat-completion provider abstraction.
//!
//! A provider turns one multimodal request into a lazy, finite stream of text
//! deltas. The stream is not restartable; dropping it cancels the upstream
//! call.

pub mod mock;
pub mod openai;

use crate::services::images::EncodedImage;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// One multimodal completion request: prompt text plus ordered images.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub images: Vec<EncodedImage>,
}

/// Type alias for provider delta streams.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Trait for streaming chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open a streaming completion call. Each item is one non-empty text
    /// delta, in arrival order; the stream ends when the upstream finishes.
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError>;
}
