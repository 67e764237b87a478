use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::adapter::InferenceAdapter;
use crate::credential::Credential;
use crate::registry::ModelRegistry;
use crate::request::GenerationRequest;
use crate::transport::Transport;
use crate::BackendFoot;

/// Shared, read-only state handed to every generation task
pub struct BackendState<T>
{   pub adapter: Arc<InferenceAdapter<T>>
  , pub registry: Arc<ModelRegistry>
  , pub credential: Arc<Credential>
}

impl<T> Clone for BackendState<T>
{   fn clone(&self) -> Self
    {   BackendState
        {   adapter: Arc::clone(&self.adapter)
          , registry: Arc::clone(&self.registry)
          , credential: Arc::clone(&self.credential)
        }
    }
}

/// Owns a background task running the adapter, so UI code can queue
/// prompts and await replies without blocking.
pub struct InferenceBackend
{   hand: crate::BackendHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl InferenceBackend
{   /// Create and spawn a new backend
    /// Returns immediately - spawns background task
    pub fn new<T: Transport + 'static>(
      adapter: InferenceAdapter<T>
    , registry: ModelRegistry
    , credential: Credential
    ) -> Self
    {   debug!("Creating InferenceBackend with task ownership");

        let (generate_tx, generate_rx)
          = mpsc::unbounded_channel();
        let (list_models_tx, list_models_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let hand = crate::BackendHand
        {   generate_tx
          , list_models_tx
          , shutdown_tx
        };

        let foot = crate::BackendFoot
        {   generate_rx
          , list_models_rx
          , shutdown_rx
        };

        let state = BackendState
        {   adapter: Arc::new(adapter)
          , registry: Arc::new(registry)
          , credential: Arc::new(credential)
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, state).await
        });

        InferenceBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a generation - returns almost immediately
    pub fn generate(
      &self
    , model: impl Into<String>
    , prompt: impl Into<String>
    , max_tokens: Option<u32>
    , temperature: Option<f32>
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GenerateReply>,
        crate::error::Error
      >
    {   let model = model.into();
        debug!("generate queuing command for model: {}", model);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GenerateArgs
        {   model
          , prompt: prompt.into()
          , max_tokens
          , temperature
          , reply: reply_tx
        };

        self.hand.generate_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendDisconnected
          })?;

        Ok(reply_rx)
    }

    /// Registry identifiers - returns almost immediately
    pub fn list_models(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::ListModelsReply>,
        crate::error::Error
      >
    {   debug!("list_models queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.list_models_tx
          .send(crate::ListModelsArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendDisconnected
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down InferenceBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.shutdown_tx
          .send(crate::ShutdownArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::BackendDisconnected
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend exited without confirming shutdown");
            Err(crate::error::Error::BackendDisconnected)
        }
    }
}

/// Main backend event loop
///
/// Each select arm only routes; generation runs in its own task so
/// a slow endpoint never holds up the queue.
async fn run_backend_loop<T: Transport + 'static>(
  foot: BackendFoot
, state: BackendState<T>
)
{   debug!("Starting InferenceBackend event loop");
    let BackendFoot
    {   mut generate_rx
      , mut list_models_rx
      , mut shutdown_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_rx.recv() => {
          debug!("Received Generate for model: {}", cmd.model);
          let model = match state.registry.get(&cmd.model)
          {   Ok(model) => model
            , Err(e) => {
                let _ = cmd.reply.send(Err(e));
                continue;
              }
          };

          let mut request = GenerationRequest::new(cmd.prompt, model);
          request.max_tokens = cmd.max_tokens;
          request.temperature = cmd.temperature;

          let state = state.clone();
          tokio::spawn(async move {
            let result = state.adapter
              .generate(&request, &state.credential)
              .await;
            let _ = cmd.reply.send(Ok(result));
          });
        }
      , Some(cmd) = list_models_rx.recv() => {
          debug!("Received ListModels");
          let _ = cmd.reply.send(Ok(state.registry.identifiers()));
        }
      , Some(cmd) = shutdown_rx.recv() => {
          debug!("Received Shutdown");
          let _ = cmd.reply.send(Ok(()));
          info!("InferenceBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
