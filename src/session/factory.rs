//! Client construction

use std::sync::Arc;

use crate::cache::RequestCache;
use crate::client::{ConduitClient, ConnectionOptions, Transport};
use crate::config::{ClientSettings, Config};
use crate::error::Result;

use super::ApiToken;

/// Builds [`ConduitClient`]s that share URL, settings and connection options.
///
/// Each client gets its own HTTP transport and, unless
/// [`with_shared_cache`](Self::with_shared_cache) was used, its own cache.
pub struct ClientFactory {
    api_url: String,
    settings: ClientSettings,
    options: ConnectionOptions,
    shared_cache: Option<Arc<RequestCache>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientFactory {
    pub fn new(api_url: impl Into<String>, settings: ClientSettings) -> Self {
        Self {
            api_url: api_url.into(),
            settings,
            options: ConnectionOptions::default(),
            shared_cache: None,
            transport: None,
        }
    }

    /// Factory for a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.url()?, config.client.clone())
            .with_connection(ConnectionOptions::from(config)))
    }

    pub fn with_connection(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Share one cache across every client built here.
    ///
    /// Entries stay isolated per token through the key partition.
    pub fn with_shared_cache(mut self, cache: Arc<RequestCache>) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    /// Route every client through `transport` instead of a fresh HTTP
    /// transport. Retry and cache layers still wrap it per client.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn build(&self, token: ApiToken) -> Result<ConduitClient> {
        let cache = self
            .shared_cache
            .clone()
            .unwrap_or_else(|| Arc::new(RequestCache::new()));

        match self.transport {
            Some(ref transport) => Ok(ConduitClient::new(
                &self.api_url,
                token,
                self.settings.clone(),
                cache,
                transport.clone(),
            )),
            None => ConduitClient::connect(
                &self.api_url,
                token,
                self.settings.clone(),
                &self.options,
                cache,
            ),
        }
    }
}
