//! Outbound HTTP seam between the adapter and the remote endpoint

pub mod http;

use std::fmt;
use async_trait::async_trait;
use reqwest::Url;

pub use http::HttpTransport;

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse
{   pub status: u16
  , pub body: String
}

impl HttpResponse
{   pub fn new(status: u16, body: impl Into<String>) -> Self
    {   HttpResponse
        {   status
          , body: body.into()
        }
    }
}

/// Failure before any status was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError
{   Timeout
  , Network(String)
}

impl fmt::Display for TransportError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   TransportError::Timeout => {
              write!(f, "request exceeded timeout")
            }
          , TransportError::Network(msg) => {
              write!(f, "network error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// One JSON `POST` with a bearer token
#[async_trait]
pub trait Transport: Send + Sync
{   async fn post_json(
      &self
    , endpoint: &Url
    , credential: &crate::credential::Credential
    , body: &serde_json::Value
    ) -> Result<HttpResponse, TransportError>;
}
