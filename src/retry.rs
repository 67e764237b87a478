//! Caller-side retry for transient results.
//!
//! The adapter itself never retries; callers that can afford the
//! latency wrap `generate` with [`generate_with_retry`].

use std::time::Duration;
use log::{debug, info};
use crate::adapter::InferenceAdapter;
use crate::credential::Credential;
use crate::error::ErrorKind;
use crate::request::{GenerationRequest, GenerationResult};
use crate::transport::Transport;

/// Retry policy for transient results
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_multiplier: f32
  , pub initial_backoff: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_multiplier: f32
    , initial_backoff_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_multiplier
          , initial_backoff: Duration::from_millis(
              initial_backoff_ms
            )
        }
    }

    /// Policy from config; disabled config means no retries
    pub fn from_config(config: &crate::config::RetryConfig) -> Self
    {   let max_retries = if config.enabled
        {   config.max_retries
        } else
        {   0
        };
        RetryPolicy::new(
          max_retries
        , config.backoff_multiplier
        , config.initial_backoff_ms
        )
    }

    /// Calculate backoff duration for attempt number
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_backoff.as_millis() as f32
            * multiplier) as u64
        )
    }

    /// Only loading models and timeouts are worth another attempt
    pub fn should_retry(&self, result: &GenerationResult) -> bool
    {   matches!(
          result,
          GenerationResult::Pending(_)
            | GenerationResult::Failure(ErrorKind::Timeout, _)
        )
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from_config(
          &crate::config::RetryConfig::default()
        )
    }
}

/// Call `generate` until it returns something other than a transient
/// result or the policy's retries run out. Returns the last result.
pub async fn generate_with_retry<T: Transport>(
  adapter: &InferenceAdapter<T>
, request: &GenerationRequest
, credential: &Credential
, policy: &RetryPolicy
) -> GenerationResult
{   let mut attempt = 0;
    loop
    {   let result = adapter.generate(request, credential).await;
        if !policy.should_retry(&result) || attempt >= policy.max_retries
        {   return result;
        }
        let backoff = policy.backoff_for_attempt(attempt);
        debug!(
          "Attempt {} for {} was transient, sleeping {:?}",
          attempt + 1, request.model.identifier, backoff
        );
        tokio::time::sleep(backoff).await;
        attempt += 1;
        info!(
          "Retrying {} (retry {} of {})",
          request.model.identifier, attempt, policy.max_retries
        );
    }
}
