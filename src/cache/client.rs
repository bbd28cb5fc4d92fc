//! Caching layer for any transport
//!
//! Serves idempotent GET requests from a [`RequestCache`] and passes every
//! other request straight through.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{RequestCache, derive_cache_key};
use crate::client::{HttpRequest, Transport};
use crate::error::Result;

/// Cached wrapper for any [`Transport`].
///
/// Caching can be disabled per client via `enabled` (for `--no-cache`).
/// Failed calls are never stored.
pub struct CachedCall<T> {
    inner: T,
    cache: Arc<RequestCache>,
    enabled: bool,
    ttl: Duration,
    partition: String,
}

impl<T: Transport> CachedCall<T> {
    /// Create a new caching layer.
    ///
    /// # Arguments
    /// * `inner` - The transport to wrap
    /// * `cache` - Storage, possibly shared with other clients
    /// * `enabled` - Whether caching is enabled for this client
    /// * `ttl` - Lifetime of entries written by this client
    /// * `partition` - Session scope mixed into every key
    pub fn new(
        inner: T,
        cache: Arc<RequestCache>,
        enabled: bool,
        ttl: Duration,
        partition: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            cache,
            enabled,
            ttl,
            partition: partition.into(),
        }
    }

    fn should_cache(&self, request: &HttpRequest) -> bool {
        self.enabled && !request.url.is_empty() && request.is_cacheable_method()
    }
}

#[async_trait]
impl<T: Transport> Transport for CachedCall<T> {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        if !self.should_cache(request) {
            return self.inner.send(request).await;
        }

        let key = derive_cache_key(request, &self.partition);

        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Cache hit: {} {}", request.method, request.url);
            return Ok(cached);
        }

        log::debug!("Cache miss: {} {}", request.method, request.url);
        let result = self.inner.send(request).await?;
        self.cache.insert(key, result.clone(), self.ttl);
        Ok(result)
    }
}
