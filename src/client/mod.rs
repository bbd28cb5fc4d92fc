//! Conduit API client
//!
//! Outbound calls flow through three layers, composed explicitly in
//! [`ConduitClient::new`]:
//!
//! ```text
//! RetriableCall -> CachedCall -> HttpTransport
//! ```
//!
//! Retry sits outside the cache, so a cache hit never enters the retry loop
//! and every retry attempt can still be served from cache.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

pub mod api;
pub mod conduit;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod params;
pub mod retry;

pub use conduit::{ClientStats, ConduitClient};
pub use http::{ConnectionOptions, HttpTransport};
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockTransport;
pub use retry::{RetriableCall, RetryPolicy};

/// Something that can execute an [`HttpRequest`] and yield its JSON body.
///
/// The raw HTTP transport and both decorating layers implement this, which
/// keeps the layering order visible where the stack is built.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        (**self).send(request).await
    }
}

/// A single outbound HTTP call.
///
/// Maps are ordered so two logically identical requests always compare and
/// hash the same. Header names are stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub json: Option<Value>,
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Build a request, parsing the method case-insensitively.
    pub fn new(method: &str, url: impl Into<String>) -> Result<Self> {
        let method = Method::from_bytes(method.trim().to_uppercase().as_bytes())
            .map_err(|_| Error::Other(format!("Invalid HTTP method: {}", method)))?;
        Ok(Self::with_method(method, url))
    }

    pub fn with_method(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: BTreeMap::new(),
            form: BTreeMap::new(),
            json: None,
            headers: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(Method::POST, url)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    pub fn form_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json(mut self, payload: Value) -> Self {
        self.json = Some(payload);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Only GET is idempotent enough to cache.
    pub fn is_cacheable_method(&self) -> bool {
        self.method == Method::GET
    }
}
