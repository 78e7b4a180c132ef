//! Rate limiting for completion models

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rig::{
    completion::{self, CompletionError, CompletionModel, CompletionRequest, CompletionResponse},
};
use tracing::{Instrument, debug_span, info_span};

/// Raw response of a rate-limited model
pub struct RateLimitResponse<T> {
    response: T,
}

impl<T> RateLimitResponse<T> {
    /// The wrapped model's raw response
    pub fn inner(&self) -> &T {
        &self.response
    }
}

/// A completion model that waits for a limiter permit before each request
///
/// Clones share the limiter, so the quota holds across all of them.
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    /// Wrap `model` with an existing limiter
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }

    /// Wrap `model`, allowing `requests` completions per minute
    pub fn per_minute(model: M, requests: NonZeroU32) -> Self {
        Self::new(model, RateLimiter::direct(Quota::per_minute(requests)))
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = RateLimitResponse<M::Response>;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<completion::CompletionResponse<Self::Response>, CompletionError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;

        let response = self
            .model
            .completion(completion_request)
            .instrument(info_span!("completion"))
            .await?;

        Ok(CompletionResponse {
            choice: response.choice,
            raw_response: RateLimitResponse {
                response: response.raw_response,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use rig::agent::AgentBuilder;
    use rig::completion::Prompt;

    #[tokio::test]
    async fn test_passes_through_response() {
        let mock = MockCompletionModel::with_text("limited hello");
        let model = RateLimitedCompletionModel::per_minute(
            mock.clone(),
            NonZeroU32::new(60).unwrap(),
        );

        let agent = AgentBuilder::new(model).preamble("be brief").build();
        let reply = agent.prompt("hi").await.unwrap();

        assert_eq!(reply, "limited hello");
        assert_eq!(mock.requests().await.len(), 1);
    }
}
