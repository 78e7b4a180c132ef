//! # Scripted Completion Model for Tests
//!
//! `MockCompletionModel` answers every request with a fixed text, or fails
//! when no text is set, and records the preamble and temperature of each
//! request so tests can inspect what was sent.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a mock saw in one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub preamble: Option<String>,
    pub temperature: Option<f64>,
}

/// A completion model with a scripted reply
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    reply: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCompletionModel {
    /// A mock that fails every request until a reply is set
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that answers with `text`
    pub fn with_text(text: &str) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Some(text.to_string()))),
            ..Self::default()
        }
    }

    /// Replace the scripted reply
    pub async fn set_text_response(&self, text: &str) {
        *self.reply.lock().await = Some(text.to_string());
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.requests.lock().await.push(RecordedRequest {
            preamble: request.preamble.clone(),
            temperature: request.temperature,
        });

        match self.reply.lock().await.clone() {
            Some(text) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(&text)),
                raw_response: text,
            }),
            None => Err(CompletionError::ProviderError(
                "no scripted reply".to_string(),
            )),
        }
    }
}
