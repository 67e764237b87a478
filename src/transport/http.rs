use std::time::Duration;
use async_trait::async_trait;
use log::{error, trace};
use reqwest::Url;
use super::{HttpResponse, Transport, TransportError};

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
}

impl HttpTransport
{   /// Client with the request timeout applied
    pub fn new(timeout: Duration)
      -> Result<Self, crate::error::Error>
    {   let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HttpTransport
        {   http_client
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError
{   if e.is_timeout()
    {   TransportError::Timeout
    } else
    {   TransportError::Network(e.without_url().to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn post_json(
      &self
    , endpoint: &Url
    , credential: &crate::credential::Credential
    , body: &serde_json::Value
    ) -> Result<HttpResponse, TransportError>
    {   trace!("POST {}", endpoint);
        let response = self.http_client
          .post(endpoint.clone())
          .bearer_auth(credential.expose())
          .json(body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            classify_reqwest_error(e)
          })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
          error!("Failed to read body: {}", e);
          classify_reqwest_error(e)
        })?;

        trace!("Response status: {}", status);
        Ok(HttpResponse
        {   status
          , body
        })
    }
}

impl std::fmt::Debug for HttpTransport
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("HttpTransport").finish()
    }
}
