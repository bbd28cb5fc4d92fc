//! Conduit API client implementation

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::params::flatten_params;
use super::{ConnectionOptions, HttpRequest, HttpTransport, RetriableCall, Transport};
use crate::cache::{CachedCall, RequestCache};
use crate::config::ClientSettings;
use crate::error::{ApiError, Error, Result};
use crate::session::ApiToken;

type LayeredTransport = RetriableCall<CachedCall<Arc<dyn Transport>>>;

/// A client bound to one API URL and one token.
///
/// Owns its transport stack. The [`RequestCache`] may be private to this
/// client or shared; cache keys are partitioned by token either way.
pub struct ConduitClient {
    api_url: String,
    token: ApiToken,
    settings: ClientSettings,
    cache: Arc<RequestCache>,
    transport: LayeredTransport,
}

/// Settings summary and cache size for one client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStats {
    pub api_url: String,
    pub timeout: f64,
    pub max_retries: u32,
    pub enable_cache: bool,
    pub cache_ttl: u64,
    pub cache_size: usize,
}

impl ConduitClient {
    /// Build a client over an existing raw transport.
    ///
    /// The raw transport is wrapped as `retry(cache(raw))`.
    pub fn new(
        api_url: &str,
        token: ApiToken,
        settings: ClientSettings,
        cache: Arc<RequestCache>,
        raw: Arc<dyn Transport>,
    ) -> Self {
        let cached = CachedCall::new(
            raw,
            cache.clone(),
            settings.enable_cache,
            settings.cache_ttl(),
            token.fingerprint(),
        );
        let transport = RetriableCall::new(cached, settings.retry_policy());

        Self {
            api_url: normalize_url(api_url),
            token,
            settings,
            cache,
            transport,
        }
    }

    /// Build a client with its own reqwest-backed transport
    pub fn connect(
        api_url: &str,
        token: ApiToken,
        settings: ClientSettings,
        options: &ConnectionOptions,
        cache: Arc<RequestCache>,
    ) -> Result<Self> {
        let raw = HttpTransport::new(&settings, options)?;
        Ok(Self::new(api_url, token, settings, cache, Arc::new(raw)))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Send an arbitrary request through retry and cache
    pub async fn request(&self, request: HttpRequest) -> Result<Value> {
        self.transport.send(&request).await
    }

    /// Call a Conduit method and return its `result`.
    ///
    /// `params` must be a JSON object (or null). Conduit calls are POSTs and
    /// therefore never served from cache.
    pub async fn call_method(&self, method: &str, params: Value) -> Result<Value> {
        let mut form = match params {
            Value::Null => Vec::new(),
            Value::Object(_) => flatten_params(&params, ""),
            other => {
                return Err(Error::Other(format!(
                    "Parameters for {} must be a JSON object, got {}",
                    method, other
                )));
            }
        };
        form.push(("api.token".to_string(), self.token.as_str().to_string()));

        log::debug!("Calling {}", method);
        let url = format!("{}{}", self.api_url, method);
        let data = self
            .request(HttpRequest::post(url).form_params(form))
            .await?;

        parse_conduit_response(data)
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            api_url: self.api_url.clone(),
            timeout: self.settings.timeout,
            max_retries: self.settings.max_retries,
            enable_cache: self.settings.enable_cache,
            cache_ttl: self.settings.cache_ttl,
            cache_size: self.cache.len(),
        }
    }

    /// Drop every cached response, including other clients' when the cache is shared
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for ConduitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConduitClient")
            .field("api_url", &self.api_url)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

fn normalize_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Unwrap a Conduit envelope `{"result": .., "error_code": .., "error_info": ..}`
pub fn parse_conduit_response(data: Value) -> Result<Value> {
    let mut envelope = match data {
        Value::Object(map) => map,
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "Expected a JSON object, got {}",
                other
            ))
            .into());
        }
    };

    if let Some(code) = envelope
        .get("error_code")
        .filter(|c| !c.is_null() && c.as_str() != Some(""))
    {
        let code = match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let info = envelope
            .get("error_info")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Err(ApiError::Remote { code, info }.into());
    }

    Ok(envelope
        .remove("result")
        .unwrap_or_else(|| Value::Object(Map::new())))
}
