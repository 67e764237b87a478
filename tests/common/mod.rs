//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use hfinfer::transport::{HttpResponse, Transport, TransportError};
use hfinfer::{Credential, ModelDescriptor, PayloadFamily};
use reqwest::Url;

pub const TOKEN: &str = "hf_test_secret_token";

/// What the mock does with a call
pub enum Scripted
{   Respond(HttpResponse)
  , Fail(TransportError)
  , Stall(Duration, HttpResponse)
}

/// Everything the adapter handed to the transport
#[derive(Debug, Clone)]
pub struct CapturedCall
{   pub endpoint: Url
  , pub token: String
  , pub body: serde_json::Value
}

type Handler = Box<dyn Fn(&CapturedCall) -> Scripted + Send + Sync>;

pub struct MockTransport
{   handler: Handler
  , calls: Arc<Mutex<Vec<CapturedCall>>>
}

impl MockTransport
{   pub fn new<F>(handler: F) -> Self
    where
      F: Fn(&CapturedCall) -> Scripted + Send + Sync + 'static
    {   MockTransport
        {   handler: Box::new(handler)
          , calls: Arc::new(Mutex::new(vec![]))
        }
    }

    /// Same reply to every call
    pub fn respond(status: u16, body: &str) -> Self
    {   let body = body.to_string();
        MockTransport::new(move |_| {
          Scripted::Respond(HttpResponse::new(status, body.clone()))
        })
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<CapturedCall>>>
    {   Arc::clone(&self.calls)
    }

    pub fn call_count(&self) -> usize
    {   self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport
{   async fn post_json(
      &self
    , endpoint: &Url
    , credential: &Credential
    , body: &serde_json::Value
    ) -> Result<HttpResponse, TransportError>
    {   let call = CapturedCall
        {   endpoint: endpoint.clone()
          , token: credential.expose().to_string()
          , body: body.clone()
        };
        let action = (self.handler)(&call);
        self.calls.lock().unwrap().push(call);
        match action
        {   Scripted::Respond(response) => Ok(response)
          , Scripted::Fail(e) => Err(e)
          , Scripted::Stall(delay, response) => {
              tokio::time::sleep(delay).await;
              Ok(response)
            }
        }
    }
}

pub fn init_logger()
{   let _ = env_logger::builder().is_test(true).try_init();
}

pub fn credential() -> Credential
{   Credential::new(TOKEN)
}

pub fn token_limited() -> Arc<ModelDescriptor>
{   Arc::new(
      ModelDescriptor::new(
        "test/token-limited"
      , "http://localhost:8080/token-limited"
      , PayloadFamily::TokenLimited
      , 64
      , 0.5
      ).unwrap()
    )
}

pub fn length_limited() -> Arc<ModelDescriptor>
{   Arc::new(
      ModelDescriptor::new(
        "test/length-limited"
      , "http://localhost:8080/length-limited"
      , PayloadFamily::LengthLimited
      , 128
      , 1.5
      ).unwrap()
    )
}

/// `[{"generated_text": text}]`
pub fn generated(text: &str) -> String
{   serde_json::json!([{ "generated_text": text }]).to_string()
}
