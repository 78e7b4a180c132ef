//! # Language Model Module
//!
//! Completion models used by the answer service, with client-side rate
//! limiting so a burst of answer requests cannot exhaust the API quota.
//!
//! ## Key Components
//!
//! - `RateLimitedCompletionModel`: wraps any `rig` completion model with a
//!   `governor` limiter
//! - `gemini_from_env`: a rate-limited Gemini model configured from the
//!   environment

use std::num::NonZeroU32;

use rig::providers::gemini;

use crate::error::{Error, Result};

pub mod ratelimited_completion;

#[cfg(test)]
pub mod mock_model;

pub use ratelimited_completion::{RateLimitResponse, RateLimitedCompletionModel};

/// Model used when none is named
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Requests per minute allowed when no quota is named
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

/// Build a rate-limited Gemini completion model from `GEMINI_API_KEY`
///
/// # Arguments
///
/// * `model` - The Gemini model name
/// * `per_minute` - Maximum completion requests per minute
pub fn gemini_from_env(
    model: &str,
    per_minute: u32,
) -> Result<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| Error::Auth("GEMINI_API_KEY environment variable not set".to_string()))?;
    let per_minute = NonZeroU32::new(per_minute)
        .ok_or_else(|| Error::InvalidRequest("rate limit must be positive".to_string()))?;

    let client = gemini::Client::new(&api_key);
    Ok(RateLimitedCompletionModel::per_minute(
        client.completion_model(model),
        per_minute,
    ))
}
