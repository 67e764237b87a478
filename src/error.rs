use std::fmt;

/// Classification of a failed generation call.
///
/// `InvalidInput` and `MissingCredential` are raised before any
/// network traffic; every other kind means one call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{   /// Prompt was empty after trimming
    InvalidInput
  , /// Credential was empty
    MissingCredential
  , /// Outbound call exceeded the fixed timeout
    Timeout
  , /// Connection or transport failure
    NetworkError
  , /// HTTP 401
    Unauthorized
  , /// HTTP 403
    Forbidden
  , /// 2xx body did not contain generated text
    UnexpectedResponseShape
  , /// Any other non-success status
    RemoteError
}

impl fmt::Display for ErrorKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   let name = match self
        {   ErrorKind::InvalidInput => "invalid input"
          , ErrorKind::MissingCredential => "missing credential"
          , ErrorKind::Timeout => "timeout"
          , ErrorKind::NetworkError => "network error"
          , ErrorKind::Unauthorized => "unauthorized"
          , ErrorKind::Forbidden => "forbidden"
          , ErrorKind::UnexpectedResponseShape => {
              "unexpected response shape"
            }
          , ErrorKind::RemoteError => "remote error"
        };
        f.write_str(name)
    }
}

/// Crate-level error for everything around the adapter:
/// registry lookups, configuration and the backend task.
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Identifier is not in the model registry
    UnknownModel(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// No credential found in any configured source
    MissingCredential(String)
  , /// Backend task is gone
    BackendDisconnected
  , /// Failed to parse configuration
    ParseError(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::UnknownModel(id) => {
              write!(f, "Unknown model: {}", id)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::MissingCredential(sources) => {
              write!(f, "No credential found in: {}", sources)
            }
          , Error::BackendDisconnected => {
              write!(f, "Inference backend disconnected")
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}
