//! Static model registry: one descriptor per supported identifier

use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, error};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Base for hosted inference endpoints; the identifier is appended
pub const HOSTED_INFERENCE_BASE: &str
  = "https://api-inference.huggingface.co/models/";

/// Placeholder substituted by the user text in a prompt template
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// JSON body shape an endpoint expects for generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFamily
{   /// `max_new_tokens`, and asks the endpoint not to echo the prompt
    TokenLimited
  , /// `max_length`; the endpoint echoes the prompt
    LengthLimited
}

/// Instruction framing wrapped around user text before sending.
///
/// Substitution is plain text: the first `{prompt}` in the template
/// is replaced once and the result is never re-scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl PromptTemplate
{   pub fn new(template: impl Into<String>)
      -> Result<Self, crate::error::Error>
    {   let template = template.into();
        if !template.contains(PROMPT_PLACEHOLDER)
        {   error!("Prompt template lacks placeholder");
            return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "prompt template must contain {}",
                PROMPT_PLACEHOLDER
              )
            ));
        }
        Ok(PromptTemplate(template))
    }

    pub fn apply(&self, prompt: &str) -> String
    {   match self.0.split_once(PROMPT_PLACEHOLDER)
        {   Some((head, tail)) => {
              let mut out = String::with_capacity(
                head.len() + prompt.len() + tail.len()
              );
              out.push_str(head);
              out.push_str(prompt);
              out.push_str(tail);
              out
            }
          , None => prompt.to_string()
        }
    }

    pub fn as_str(&self) -> &str
    {   &self.0
    }
}

/// Everything the adapter needs to know about one remote model.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor
{   /// Opaque key understood by the remote endpoint
    pub identifier: String
  , pub endpoint: Url
  , pub payload_family: PayloadFamily
  , pub default_max_tokens: u32
  , /// Always within (0, 2]
    pub default_temperature: f32
  , pub prompt_template: Option<PromptTemplate>
}

impl ModelDescriptor
{   /// Build a descriptor, validating endpoint and defaults
    pub fn new(
      identifier: impl Into<String>
    , endpoint: &str
    , payload_family: PayloadFamily
    , default_max_tokens: u32
    , default_temperature: f32
    ) -> Result<Self, crate::error::Error>
    {   let identifier = identifier.into();
        if identifier.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model identifier is empty".to_string()
            ));
        }
        let endpoint = Url::parse(endpoint).map_err(|e| {
          error!("Bad endpoint for {}: {}", identifier, e);
          crate::error::Error::InvalidConfiguration(
            format!("endpoint for {}: {}", identifier, e)
          )
        })?;
        if default_max_tokens == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("{}: default_max_tokens must be > 0", identifier)
            ));
        }
        if !default_temperature.is_finite()
          || default_temperature <= 0.0
          || default_temperature > crate::request::MAX_TEMPERATURE
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "{}: default_temperature {} outside (0, 2]",
                identifier, default_temperature
              )
            ));
        }
        Ok(ModelDescriptor
        {   identifier
          , endpoint
          , payload_family
          , default_max_tokens
          , default_temperature
          , prompt_template: None
        })
    }

    /// Descriptor for a model served under the hosted inference base
    pub fn hosted(
      identifier: &str
    , payload_family: PayloadFamily
    , default_max_tokens: u32
    , default_temperature: f32
    ) -> Result<Self, crate::error::Error>
    {   ModelDescriptor::new(
          identifier
        , &format!("{}{}", HOSTED_INFERENCE_BASE, identifier)
        , payload_family
        , default_max_tokens
        , default_temperature
        )
    }

    pub fn with_template(
      mut self
    , template: PromptTemplate
    ) -> Self
    {   self.prompt_template = Some(template);
        self
    }

    /// User text as it goes on the wire
    pub fn frame_prompt(&self, prompt: &str) -> String
    {   match &self.prompt_template
        {   Some(template) => template.apply(prompt)
          , None => prompt.to_string()
        }
    }
}

/// Exhaustive lookup of supported models. Unknown identifiers are an
/// error; there is no fallback family.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry
{   models: BTreeMap<String, Arc<ModelDescriptor>>
}

impl ModelRegistry
{   pub fn new() -> Self
    {   ModelRegistry::default()
    }

    /// Models offered by the chat pages out of the box
    pub fn builtin() -> Result<Self, crate::error::Error>
    {   debug!("Building builtin model registry");
        let mut registry = ModelRegistry::new();
        registry.insert(
          ModelDescriptor::hosted(
            "mistralai/Mistral-7B-Instruct-v0.2"
          , PayloadFamily::TokenLimited
          , 512
          , 0.7
          )?
          .with_template(PromptTemplate::new(
            "<s>[INST] {prompt} [/INST]"
          )?)
        )?;
        registry.insert(
          ModelDescriptor::hosted(
            "meta-llama/Llama-2-7b-chat-hf"
          , PayloadFamily::TokenLimited
          , 512
          , 0.7
          )?
          .with_template(PromptTemplate::new(
            "[INST] {prompt} [/INST]"
          )?)
        )?;
        registry.insert(
          ModelDescriptor::hosted(
            "HuggingFaceH4/zephyr-7b-beta"
          , PayloadFamily::TokenLimited
          , 512
          , 0.7
          )?
          .with_template(PromptTemplate::new(
            "<|user|>\n{prompt}</s>\n<|assistant|>\n"
          )?)
        )?;
        registry.insert(ModelDescriptor::hosted(
          "google/flan-t5-large"
        , PayloadFamily::TokenLimited
        , 256
        , 0.7
        )?)?;
        registry.insert(ModelDescriptor::hosted(
          "microsoft/DialoGPT-medium"
        , PayloadFamily::LengthLimited
        , 200
        , 0.7
        )?)?;
        registry.insert(ModelDescriptor::hosted(
          "gpt2"
        , PayloadFamily::LengthLimited
        , 200
        , 0.8
        )?)?;
        Ok(registry)
    }

    /// Builtins plus any models named in the configuration
    pub fn from_config(
      config: &crate::config::AdapterConfig
    ) -> Result<Self, crate::error::Error>
    {   let mut registry = ModelRegistry::builtin()?;
        for entry in &config.models
        {   registry.insert(entry.to_descriptor()?)?;
        }
        debug!("Registry holds {} models", registry.len());
        Ok(registry)
    }

    /// Add a descriptor; identifiers must be unique
    pub fn insert(
      &mut self
    , descriptor: ModelDescriptor
    ) -> Result<(), crate::error::Error>
    {   if self.models.contains_key(&descriptor.identifier)
        {   error!("Duplicate model: {}", descriptor.identifier);
            return Err(crate::error::Error::InvalidConfiguration(
              format!("duplicate model {}", descriptor.identifier)
            ));
        }
        self.models.insert(
          descriptor.identifier.clone(),
          Arc::new(descriptor)
        );
        Ok(())
    }

    pub fn get(&self, identifier: &str)
      -> Result<Arc<ModelDescriptor>, crate::error::Error>
    {   self.models.get(identifier)
          .cloned()
          .ok_or_else(|| {
            error!("Model not in registry: {}", identifier);
            crate::error::Error::UnknownModel(identifier.to_string())
          })
    }

    pub fn identifiers(&self) -> Vec<String>
    {   self.models.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>>
    {   self.models.values()
    }

    pub fn len(&self) -> usize
    {   self.models.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.models.is_empty()
    }
}
