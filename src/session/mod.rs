//! Per-request client resolution
//!
//! Two strategies decide which [`ConduitClient`] serves a request:
//!
//! - **Stateless** (multi-tenant): every request carries its own token in the
//!   `X-PHABRICATOR-TOKEN` header and gets a brand-new client. Nothing is
//!   memoized, so no state can leak between requests.
//! - **Stateful** (single-tenant): one client is built on first use from the
//!   header token or the process token and reused for the process lifetime.
//!
//! The mode is chosen once at startup via [`SessionMode::provider`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client::ConduitClient;
use crate::error::Result;

mod factory;
mod provider;
mod token;

pub use factory::ClientFactory;
pub use provider::{StatefulSessionProvider, StatelessSessionProvider};
pub use token::{ApiToken, TOKEN_HEADER, TOKEN_LENGTH, validate_token};

/// Inbound request metadata. Header names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
            .collect();
        Self { headers }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The per-request token, if a non-empty one was sent
    pub fn token(&self) -> Option<&str> {
        self.header(TOKEN_HEADER).filter(|t| !t.is_empty())
    }
}

/// Resolves the client that serves a request
pub trait SessionProvider: Send + Sync {
    fn get_or_create_client(&self, context: &RequestContext) -> Result<Arc<ConduitClient>>;

    fn mode(&self) -> SessionMode;
}

/// Session strategy, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Stateless,
    Stateful,
}

impl SessionMode {
    /// Build the provider for this mode.
    ///
    /// `process_token` is only consulted in stateful mode; stateless mode
    /// never falls back to it.
    pub fn provider(
        self,
        factory: ClientFactory,
        process_token: Option<String>,
    ) -> Arc<dyn SessionProvider> {
        match self {
            SessionMode::Stateless => Arc::new(StatelessSessionProvider::new(factory)),
            SessionMode::Stateful => {
                Arc::new(StatefulSessionProvider::new(factory, process_token))
            }
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Stateless => write!(f, "stateless"),
            SessionMode::Stateful => write!(f, "stateful"),
        }
    }
}
