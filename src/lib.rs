//! hfinfer: one adapter for hosted text-generation endpoints.
//!
//! Callers pick a [`ModelDescriptor`] from the [`ModelRegistry`],
//! build a [`GenerationRequest`] and get back a [`GenerationResult`]:
//! generated text, a pending signal while the model loads, or a
//! classified failure. Payload shape follows the descriptor's
//! [`PayloadFamily`], never the model name.

pub mod error;
pub mod config;
pub mod credential;
pub mod registry;
pub mod request;
pub mod transport;
pub mod adapter;
pub mod retry;
pub mod conversation;
pub mod backend;

pub use adapter::InferenceAdapter;
pub use backend::InferenceBackend;
pub use config::AdapterConfig;
pub use conversation::Conversation;
pub use credential::Credential;
pub use error::{Error, ErrorKind};
pub use registry::{ModelDescriptor, ModelRegistry, PayloadFamily, PromptTemplate};
pub use request::{GenerationRequest, GenerationResult};
pub use retry::{generate_with_retry, RetryPolicy};

/// BACKEND API INTERFACE:

// ===== Generate =====

pub type GenerateReply
  = Result<GenerationResult, crate::error::Error>;
pub type GenerateReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerateReply>;

pub struct GenerateArgs
{   pub model: String
  , pub prompt: String
  , pub max_tokens: Option<u32>
  , pub temperature: Option<f32>
  , pub reply: GenerateReplySender
}

// ===== ListModels =====

pub type ListModelsReply
  = Result<Vec<String>, crate::error::Error>;
pub type ListModelsReplySender
  = tokio::sync::mpsc::UnboundedSender<ListModelsReply>;

pub struct ListModelsArgs
{   pub reply: ListModelsReplySender
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), crate::error::Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== BackendHand (sender side) =====

pub struct BackendHand
{   pub generate_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateArgs>
  , pub list_models_tx
      : tokio::sync::mpsc::UnboundedSender<ListModelsArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== BackendFoot (receiver side) =====

pub struct BackendFoot
{   pub generate_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateArgs>
  , pub list_models_rx
      : tokio::sync::mpsc::UnboundedReceiver<ListModelsArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}

/// Install an `env_logger` subscriber once; later calls are no-ops
pub fn init_logging()
{   let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
