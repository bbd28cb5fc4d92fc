//! Retry layer with exponential backoff

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use super::{HttpRequest, Transport};
use crate::error::Result;

/// Retry settings. State (the current delay) lives in one call, never here.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Applied to the delay after each retry (>= 1.0)
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// No retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_multiplier)
            .unwrap_or(Duration::MAX)
    }
}

/// Retries the wrapped transport on transient failures.
///
/// Only [`Error::is_transient`](crate::error::Error::is_transient) errors are
/// retried; everything else is returned after the first attempt. Once the
/// retries are spent the last transient error is returned unchanged.
pub struct RetriableCall<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetriableCall<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for RetriableCall<T> {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0;

        loop {
            match self.inner.send(request).await {
                Ok(data) => return Ok(data),
                Err(err) if err.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "{} {} failed ({}), retry {}/{} in {:?}",
                        request.method,
                        request.url,
                        err,
                        attempt,
                        self.policy.max_retries,
                        delay
                    );
                    sleep(delay).await;
                    delay = self.policy.next_delay(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::error::{ApiError, Error};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn request() -> HttpRequest {
        HttpRequest::post("https://phab.example.com/api/conduit.ping")
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_attempt() {
        let mock = Arc::new(MockTransport::returning(json!({"result": "pong"})));
        let call = RetriableCall::new(mock.clone(), policy(3));

        let data = call.send(&request()).await.unwrap();

        assert_eq!(data["result"], json!("pong"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_attempted_max_retries_plus_one() {
        let mock = Arc::new(MockTransport::failing(|| {
            ApiError::Network("Failed to connect to API".to_string()).into()
        }));
        let call = RetriableCall::new(mock.clone(), policy(3));

        let err = call.send(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Network(_))));
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_attempted_once() {
        let mock = Arc::new(MockTransport::failing(|| {
            ApiError::InvalidResponse("not json".to_string()).into()
        }));
        let call = RetriableCall::new(mock.clone(), policy(3));

        let err = call.send(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let mock = Arc::new(MockTransport::returning(json!({"result": "ok"})));
        mock.queue(Err(ApiError::HttpStatus {
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into()));
        mock.queue(Err(ApiError::Network("Request timed out".to_string()).into()));
        let call = RetriableCall::new(mock.clone(), policy(3));

        let data = call.send(&request()).await.unwrap();

        assert_eq!(data["result"], json!("ok"));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_grow_geometrically() {
        let mock = Arc::new(MockTransport::failing(|| {
            ApiError::Network("reset".to_string()).into()
        }));
        let call = RetriableCall::new(mock.clone(), policy(3));

        let start = Instant::now();
        let _ = call.send(&request()).await;

        // 100ms + 200ms + 400ms, no sleep after the final attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(700));
        assert!(elapsed < Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_policy() {
        let mock = Arc::new(MockTransport::failing(|| {
            ApiError::Network("reset".to_string()).into()
        }));
        let call = RetriableCall::new(mock.clone(), RetryPolicy::no_retry());

        assert!(call.send(&request()).await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_next_delay_saturates() {
        let policy = RetryPolicy {
            backoff_multiplier: 10.0,
            ..Default::default()
        };
        assert_eq!(policy.next_delay(Duration::MAX), Duration::MAX);
        assert_eq!(
            policy.next_delay(Duration::from_secs(1)),
            Duration::from_secs(10)
        );
    }
}
