//! Configuration for the adapter, credential sources and retries

use std::time::Duration;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::registry::{ModelDescriptor, PayloadFamily, PromptTemplate};

/// Fixed outbound timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Secret names the chat pages have used for the token, in lookup order
pub const DEFAULT_CREDENTIAL_ENV_VARS: [&str; 4] = [
  "HF_TOKEN"
, "HUGGINGFACE_API_TOKEN"
, "HUGGINGFACEHUB_API_TOKEN"
, "HF_API_KEY"
];

/// Caller-side retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig
{   /// Retry on `Pending` and `Timeout` results
    pub enabled: bool
  , /// Max retries after the first attempt
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   enabled: true
          , max_retries: 3
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 2000
        }
    }
}

/// Extra registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry
{   pub identifier: String
  , /// Defaults to the hosted inference URL for `identifier`
    #[serde(default)]
    pub endpoint: Option<String>
  , pub payload_family: PayloadFamily
  , pub default_max_tokens: u32
  , pub default_temperature: f32
  , #[serde(default)]
    pub prompt_template: Option<String>
}

impl ModelEntry
{   pub fn to_descriptor(&self)
      -> Result<ModelDescriptor, crate::error::Error>
    {   let descriptor = match &self.endpoint
        {   Some(endpoint) => ModelDescriptor::new(
              self.identifier.clone()
            , endpoint
            , self.payload_family
            , self.default_max_tokens
            , self.default_temperature
            )?
          , None => ModelDescriptor::hosted(
              &self.identifier
            , self.payload_family
            , self.default_max_tokens
            , self.default_temperature
            )?
        };
        match &self.prompt_template
        {   Some(template) => Ok(descriptor.with_template(
              PromptTemplate::new(template.clone())?
            ))
          , None => Ok(descriptor)
        }
    }
}

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig
{   /// Request timeout in seconds
    pub timeout_secs: u64
  , /// Env vars searched for the bearer token, in order
    pub credential_env_vars: Vec<String>
  , pub retry: RetryConfig
  , /// Added to the builtin registry
    pub models: Vec<ModelEntry>
}

impl Default for AdapterConfig
{   fn default() -> Self
    {   AdapterConfig
        {   timeout_secs: DEFAULT_TIMEOUT_SECS
          , credential_env_vars: DEFAULT_CREDENTIAL_ENV_VARS
              .iter()
              .map(|s| s.to_string())
              .collect()
          , retry: RetryConfig::default()
          , models: vec![]
        }
    }
}

impl AdapterConfig
{   /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str)
      -> Result<Self, crate::error::Error>
    {   let config: AdapterConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
          "Loaded config: timeout {}s, {} extra models",
          config.timeout_secs,
          config.models.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be > 0".to_string()
            ));
        }
        if !self.retry.backoff_multiplier.is_finite()
          || self.retry.backoff_multiplier < 1.0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "retry.backoff_multiplier must be >= 1".to_string()
            ));
        }
        for entry in &self.models
        {   entry.to_descriptor()?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}
