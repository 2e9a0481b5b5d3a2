//! Mock provider implementation for testing.

use super::{ChatProvider, CompletionRequest, CompletionStream, ProviderError};
use async_trait::async_trait;

/// Mock chat provider: emits a fixed delta sequence without any network call.
pub struct MockChatProvider;

impl MockChatProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        let chunks: Vec<Result<String, ProviderError>> = vec![
            Ok("Mock".to_string()),
            Ok(" test cases".to_string()),
            Ok(format!(" for {} image(s)", request.images.len())),
        ];

        Ok(Box::pin(tokio_stream::iter(chunks)))
    }
}
