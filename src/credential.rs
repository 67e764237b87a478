//! Bearer credential and its resolution from configured sources

use std::fmt;
use log::{debug, warn};

/// Opaque bearer token. `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential
{   pub fn new(token: impl Into<String>) -> Self
    {   Credential(token.into())
    }

    /// Blank tokens count as empty
    pub fn is_empty(&self) -> bool
    {   self.0.trim().is_empty()
    }

    /// Raw token, for the authorization header only
    pub fn expose(&self) -> &str
    {   self.0.trim()
    }

    /// A non-blank manual override wins, then the first non-blank
    /// environment variable in `env_vars` order.
    pub fn resolve(
      manual_override: Option<&str>
    , env_vars: &[String]
    ) -> Result<Self, crate::error::Error>
    {   Credential::resolve_with(
          manual_override
        , env_vars
        , |name| std::env::var(name).ok()
        )
    }

    /// Same as [`Credential::resolve`] with an injectable lookup
    pub fn resolve_with<F>(
      manual_override: Option<&str>
    , env_vars: &[String]
    , lookup: F
    ) -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   if let Some(token) = manual_override
        {   if !token.trim().is_empty()
            {   debug!("Using manually supplied credential");
                return Ok(Credential::new(token));
            }
        }

        for name in env_vars
        {   match lookup(name)
            {   Some(token) if !token.trim().is_empty() => {
                  debug!("Using credential from {}", name);
                  return Ok(Credential::new(token));
                }
              , Some(_) => {
                  debug!("Skipping blank credential in {}", name);
                }
              , None => {}
            }
        }

        warn!("No credential in any of {} sources", env_vars.len());
        Err(crate::error::Error::MissingCredential(
          env_vars.join(", ")
        ))
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str("Credential([REDACTED])")
    }
}
