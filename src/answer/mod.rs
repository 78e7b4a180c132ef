//! # Answer Module
//!
//! Answers free-text tasks from the content of a single document. The model
//! is told to stay inside the document and to say "I don't know." when the
//! document does not cover the task.

use crate::document::Document;
use crate::error::Error as CrateError;
use crate::fetcher::ContentExtractor;
use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt, PromptError};
use thiserror::Error;
use tracing::{debug, instrument};

/// Reply expected when the content does not answer the task
pub const UNKNOWN_ANSWER: &str = "I don't know.";

/// Sampling temperature for answers
pub const ANSWER_TEMPERATURE: f64 = 0.2;

/// Errors raised while answering
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The model request failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// The document could not be serialized into the prompt
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document could be fetched for the URL
    #[error("Content unavailable for {0}")]
    Unavailable(String),
}

impl From<AnswerError> for CrateError {
    fn from(err: AnswerError) -> Self {
        CrateError::Answer(err.to_string())
    }
}

/// Answers a task given a document
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Answer `task` using only `document`
    async fn answer(&self, document: &Document, task: &str) -> Result<String, AnswerError>;
}

/// Answer service backed by a `rig` completion model
#[derive(Clone)]
pub struct CompletionAnswerService<M: CompletionModel> {
    model: M,
}

impl<M: CompletionModel> CompletionAnswerService<M> {
    /// Create a service over `model`
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

/// System prompt embedding the document
pub fn answer_preamble(document: &Document) -> Result<String, serde_json::Error> {
    let content = serde_json::to_string(document)?;
    Ok(format!(
        "You answer tasks using one piece of content and nothing else.\n\
         \n\
         <content>\n{content}\n</content>\n\
         \n\
         Read the task, look for the relevant parts of the content and answer \
         from them. Keep the answer short and accurate. Do not add outside \
         knowledge or guesses. If the content does not cover the task, or you \
         are not sure, reply exactly \"{UNKNOWN_ANSWER}\"\n\
         The task follows."
    ))
}

#[async_trait]
impl<M> AnswerService for CompletionAnswerService<M>
where
    M: CompletionModel + 'static,
{
    #[instrument(skip(self, document), fields(source = document.source()))]
    async fn answer(&self, document: &Document, task: &str) -> Result<String, AnswerError> {
        let preamble = answer_preamble(document)?;
        let agent = AgentBuilder::new(self.model.clone())
            .preamble(&preamble)
            .temperature(ANSWER_TEMPERATURE)
            .build();

        let answer = agent.prompt(task).await?;
        debug!("Answered task with {} characters", answer.len());
        Ok(answer)
    }
}

/// Fetch `url` and answer `task` from its content
#[instrument(skip(extractor, service))]
pub async fn web_task(
    extractor: &ContentExtractor,
    service: &dyn AnswerService,
    url: &str,
    task: &str,
) -> Result<String, AnswerError> {
    let document = extractor
        .afetch(url, false)
        .await
        .ok_or_else(|| AnswerError::Unavailable(url.to_string()))?;

    service.answer(&document, task).await
}

/// Answer `task` and return a copy of `document` whose body is the answer
pub async fn extract_answer(
    service: &dyn AnswerService,
    document: &Document,
    task: &str,
) -> Result<Document, AnswerError> {
    let answer = service.answer(document, task).await?;
    Ok(document.with_page_content(answer))
}
