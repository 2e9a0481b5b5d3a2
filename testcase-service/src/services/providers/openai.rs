//! OpenAI chat-completions provider.
//!
//! Sends one user message (prompt text followed by image data URLs) with
//! streaming enabled and forwards each `choices[0].delta.content` fragment as
//! it arrives.

use super::{ChatProvider, CompletionRequest, CompletionStream, ProviderError};
use crate::config::OpenAiConfig;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Upstream terminator for the chat-completions event stream.
const DONE_SENTINEL: &str = "[DONE]";

pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        // No timeout: the streaming call stays open for as long as the model
        // keeps producing deltas.
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: build_messages(&request),
            stream: true,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            image_count = request.images.len(),
            "Starting streaming request to OpenAI API"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "OpenAI API error {}: {}",
                status, error_text
            )));
        }

        // Create channel for streaming
        let (tx, rx) = mpsc::channel(32);

        // Spawn task to process the upstream SSE stream
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            'read: while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        buffer.push_str(&String::from_utf8_lossy(&chunk));

                        // Process complete SSE events
                        while let Some(event_end) = buffer.find("\n\n") {
                            let event = buffer[..event_end].to_string();
                            buffer = buffer[event_end + 2..].to_string();

                            match process_event(&event) {
                                EventOutcome::Delta(text) => {
                                    // A closed receiver means the caller went
                                    // away; stop reading from the upstream.
                                    if tx.send(Ok(text)).await.is_err() {
                                        return;
                                    }
                                }
                                EventOutcome::Done => break 'read,
                                EventOutcome::Skip => {}
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::NetworkError(e.to_string())))
                            .await;
                        return;
                    }
                }
            }

            // Process any remaining data in buffer
            if !buffer.trim().is_empty() {
                if let EventOutcome::Delta(text) = process_event(&buffer) {
                    let _ = tx.send(Ok(text)).await;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)) as CompletionStream)
    }
}

/// Build the single user message: one text part, then the images in order.
fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut content = Vec::with_capacity(request.images.len() + 1);
    content.push(ContentPart::Text {
        text: request.prompt.clone(),
    });
    for image in &request.images {
        content.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image.data_url.clone(),
            },
        });
    }

    vec![ChatMessage {
        role: "user".to_string(),
        content,
    }]
}

enum EventOutcome {
    /// Forward this non-empty text delta.
    Delta(String),
    /// Upstream signaled end of stream.
    Done,
    /// Nothing usable in this event.
    Skip,
}

/// Interpret one SSE event from the chat-completions stream.
fn process_event(event: &str) -> EventOutcome {
    for line in event.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        if data == DONE_SENTINEL {
            return EventOutcome::Done;
        }

        if let Some(text) = extract_delta(data) {
            if !text.is_empty() {
                return EventOutcome::Delta(text);
            }
        }
    }
    EventOutcome::Skip
}

/// Pull `choices[0].delta.content` out of one data payload, if present.
fn extract_delta(data: &str) -> Option<String> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}
