//! The inference adapter: payload shaping, one outbound call and
//! response classification.

use std::time::Duration;
use log::{debug, error, trace, warn};
use crate::credential::Credential;
use crate::error::ErrorKind;
use crate::request::{
  extract_generated_text, strip_prompt_echo, truncate_for_diagnostics,
  GenerationPayload, GenerationRequest, GenerationResult,
};
use crate::transport::{HttpResponse, HttpTransport, Transport, TransportError};

/// Returned with every 503
pub const PENDING_REASON: &str = "model is loading, retry later";

/// Stateless adapter over a transport. Safe to share between tasks.
#[derive(Debug)]
pub struct InferenceAdapter<T = HttpTransport>
{   transport: T
  , timeout: Duration
}

impl InferenceAdapter<HttpTransport>
{   /// Adapter over reqwest with the default 30s timeout
    pub fn new() -> Result<Self, crate::error::Error>
    {   InferenceAdapter::from_config(
          &crate::config::AdapterConfig::default()
        )
    }

    pub fn from_config(
      config: &crate::config::AdapterConfig
    ) -> Result<Self, crate::error::Error>
    {   config.validate()?;
        let timeout = config.timeout();
        Ok(InferenceAdapter::with_transport(
          HttpTransport::new(timeout)?
        , timeout
        ))
    }
}

impl<T: Transport> InferenceAdapter<T>
{   pub fn with_transport(transport: T, timeout: Duration) -> Self
    {   InferenceAdapter
        {   transport
          , timeout
        }
    }

    pub fn transport(&self) -> &T
    {   &self.transport
    }

    pub fn timeout(&self) -> Duration
    {   self.timeout
    }

    /// Generate text for `request`.
    ///
    /// Blank prompts and credentials fail without touching the network.
    /// Otherwise exactly one outbound call is made and never retried.
    pub async fn generate(
      &self
    , request: &GenerationRequest
    , credential: &Credential
    ) -> GenerationResult
    {   if request.prompt.trim().is_empty()
        {   warn!("Rejecting empty prompt");
            return GenerationResult::failure(
              ErrorKind::InvalidInput
            , "prompt is empty"
            );
        }
        if credential.is_empty()
        {   warn!("Rejecting request without credential");
            return GenerationResult::failure(
              ErrorKind::MissingCredential
            , "credential is empty"
            );
        }

        let model = &request.model;
        debug!(
          "Generating with {} ({:?})",
          model.identifier, model.payload_family
        );

        let payload = GenerationPayload::shape(request);
        let body = match serde_json::to_value(&payload)
        {   Ok(body) => body
          , Err(e) => {
              error!("Failed to encode payload: {}", e);
              return GenerationResult::failure(
                ErrorKind::InvalidInput
              , format!("payload encoding failed: {}", e)
              );
            }
        };
        trace!("Payload: {}", body);

        let outcome = tokio::time::timeout(
          self.timeout,
          self.transport.post_json(&model.endpoint, credential, &body)
        ).await;

        let response = match outcome
        {   Err(_) | Ok(Err(TransportError::Timeout)) => {
              error!(
                "{} timed out after {:?}",
                model.identifier, self.timeout
              );
              return GenerationResult::failure(
                ErrorKind::Timeout
              , "request exceeded timeout"
              );
            }
          , Ok(Err(TransportError::Network(msg))) => {
              error!("Network error for {}: {}", model.identifier, msg);
              return GenerationResult::failure(
                ErrorKind::NetworkError
              , msg
              );
            }
          , Ok(Ok(response)) => response
        };

        classify_response(&response, &payload.inputs)
    }
}

/// Map a completed HTTP exchange to a result.
/// `outbound_prompt` is the framed prompt that was sent.
pub fn classify_response(
  response: &HttpResponse
, outbound_prompt: &str
) -> GenerationResult
{   let status = response.status;
    debug!("Classifying status {}", status);
    match status
    {   401 => GenerationResult::failure(
          ErrorKind::Unauthorized
        , format!("401: {}", truncate_for_diagnostics(&response.body))
        )
      , 403 => GenerationResult::failure(
          ErrorKind::Forbidden
        , format!("403: {}", truncate_for_diagnostics(&response.body))
        )
      , 503 => {
          debug!("Model still loading");
          GenerationResult::Pending(PENDING_REASON.to_string())
        }
      , 200..=299 => match extract_generated_text(&response.body)
        {   Some(text) => GenerationResult::Text(
              strip_prompt_echo(&text, outbound_prompt)
            )
          , None => {
              error!("Unexpected response shape");
              GenerationResult::failure(
                ErrorKind::UnexpectedResponseShape
              , truncate_for_diagnostics(&response.body)
              )
            }
        }
      , _ => {
          error!("Remote error status {}", status);
          GenerationResult::failure(
            ErrorKind::RemoteError
          , format!(
              "{}: {}",
              status,
              truncate_for_diagnostics(&response.body)
            )
          )
        }
    }
}
