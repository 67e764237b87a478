//! Request, result and wire types for a single generation call

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::registry::{ModelDescriptor, PayloadFamily};

/// Upper bound for the sampling temperature
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Sent in place of zero, negative or non-finite temperatures
pub const MIN_TEMPERATURE: f32 = 0.01;

/// Bodies quoted in failure details are cut to this many characters
pub const MAX_DIAGNOSTIC_CHARS: usize = 512;

/// One generation call. Owned by the caller that builds it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest
{   /// The prompt text
    pub prompt: String
  , /// Model the prompt is sent to
    pub model: Arc<ModelDescriptor>
  , /// Overrides `model.default_max_tokens`
    pub max_tokens: Option<u32>
  , /// Overrides `model.default_temperature`
    pub temperature: Option<f32>
}

impl GenerationRequest
{   pub fn new(
      prompt: impl Into<String>
    , model: Arc<ModelDescriptor>
    ) -> Self
    {   GenerationRequest
        {   prompt: prompt.into()
          , model
          , max_tokens: None
          , temperature: None
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self
    {   self.temperature = Some(temperature);
        self
    }

    /// Effective parameters after defaults and clamping
    pub fn parameters(&self) -> GenerationParameters
    {   GenerationParameters::resolve(self)
    }

    /// Prompt after template framing, exactly as transmitted
    pub fn outbound_prompt(&self) -> String
    {   self.model.frame_prompt(&self.prompt)
    }
}

/// Parameters actually sent on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParameters
{   pub max_tokens: u32
  , pub temperature: f32
}

impl GenerationParameters
{   pub fn resolve(request: &GenerationRequest) -> Self
    {   let max_tokens = request.max_tokens
          .unwrap_or(request.model.default_max_tokens)
          .max(1);
        let temperature = clamp_temperature(
          request.temperature
            .unwrap_or(request.model.default_temperature)
        );
        GenerationParameters
        {   max_tokens
          , temperature
        }
    }
}

/// Clamp into (0, 2]
pub fn clamp_temperature(temperature: f32) -> f32
{   if !temperature.is_finite() && temperature > 0.0
    {   return MAX_TEMPERATURE;
    }
    if !temperature.is_finite() || temperature <= 0.0
    {   return MIN_TEMPERATURE;
    }
    temperature.min(MAX_TEMPERATURE)
}

// ===== Wire Types =====

/// Outbound JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPayload
{   pub inputs: String
  , pub parameters: PayloadParameters
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadParameters
{   TokenLimited
    {   max_new_tokens: u32
      , temperature: f32
      , do_sample: bool
      , return_full_text: bool
    }
  , LengthLimited
    {   max_length: u32
      , temperature: f32
      , do_sample: bool
    }
}

impl GenerationPayload
{   /// Shape the body for the request's payload family.
    /// Depends only on the family, never on the identifier.
    pub fn shape(request: &GenerationRequest) -> Self
    {   let params = request.parameters();
        let parameters = match request.model.payload_family
        {   PayloadFamily::TokenLimited => {
              PayloadParameters::TokenLimited
              {   max_new_tokens: params.max_tokens
                , temperature: params.temperature
                , do_sample: true
                , return_full_text: false
              }
            }
          , PayloadFamily::LengthLimited => {
              PayloadParameters::LengthLimited
              {   max_length: params.max_tokens
                , temperature: params.temperature
                , do_sample: true
              }
            }
        };
        GenerationPayload
        {   inputs: request.outbound_prompt()
          , parameters
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedText
{   generated_text: String
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum GeneratedTextBody
{   Sequence(Vec<GeneratedText>)
  , Single(GeneratedText)
}

/// Pull the generated text out of a 2xx body, if it has a known shape:
/// a single-element sequence or a bare object
pub fn extract_generated_text(body: &str) -> Option<String>
{   match serde_json::from_str::<GeneratedTextBody>(body).ok()?
    {   GeneratedTextBody::Sequence(items) if items.len() == 1 => {
          items.into_iter().next().map(|g| g.generated_text)
        }
      , GeneratedTextBody::Sequence(_) => None
      , GeneratedTextBody::Single(g) => Some(g.generated_text)
    }
}

/// Drop a verbatim prompt echo from the front of `text`
pub fn strip_prompt_echo(text: &str, prompt: &str) -> String
{   match text.strip_prefix(prompt)
    {   Some(rest) if !prompt.is_empty() => {
          rest.trim_start().to_string()
        }
      , _ => text.to_string()
    }
}

/// Bound a body for inclusion in a failure detail
pub fn truncate_for_diagnostics(body: &str) -> String
{   match body.char_indices().nth(MAX_DIAGNOSTIC_CHARS)
    {   Some((cut, _)) => format!("{}... (truncated)", &body[..cut])
      , None => body.to_string()
    }
}

// ===== Result =====

/// Outcome of one generation call
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult
{   /// Generated text, prompt echo removed
    Text(String)
  , /// Model is loading; retrying later is expected to work
    Pending(String)
  , Failure(crate::error::ErrorKind, String)
}

impl GenerationResult
{   pub fn failure(
      kind: crate::error::ErrorKind
    , detail: impl Into<String>
    ) -> Self
    {   GenerationResult::Failure(kind, detail.into())
    }

    pub fn is_text(&self) -> bool
    {   matches!(self, GenerationResult::Text(_))
    }

    pub fn is_pending(&self) -> bool
    {   matches!(self, GenerationResult::Pending(_))
    }

    pub fn text(&self) -> Option<&str>
    {   match self
        {   GenerationResult::Text(text) => Some(text)
          , _ => None
        }
    }

    pub fn failure_kind(&self) -> Option<crate::error::ErrorKind>
    {   match self
        {   GenerationResult::Failure(kind, _) => Some(*kind)
          , _ => None
        }
    }
}
