//! Mock transport for testing
//!
//! Records every request and answers from a queue of scripted results,
//! falling back to a fixed responder once the queue is empty.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{HttpRequest, Transport};
use crate::error::{Error, Result};

type Responder = Box<dyn Fn(&HttpRequest) -> Result<Value> + Send + Sync>;

/// Mock transport with call recording.
///
/// # Example
/// ```ignore
/// let mock = Arc::new(MockTransport::returning(json!({"result": "pong"})));
/// let call = RetriableCall::new(mock.clone(), RetryPolicy::default());
/// call.send(&request).await?;
/// assert_eq!(mock.call_count(), 1);
/// ```
pub struct MockTransport {
    responder: Responder,
    queued: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Always answer with `value`
    pub fn returning(value: Value) -> Self {
        Self::with_responder(move |_| Ok(value.clone()))
    }

    /// Always fail with the error produced by `make_error`
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        Self::with_responder(move |_| Err(make_error()))
    }

    /// Answer with whatever `responder` computes from the request
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot result, consumed before the responder is consulted
    pub fn queue(&self, result: Result<Value>) {
        self.queued.lock().unwrap().push_back(result);
    }

    /// Number of requests that reached this transport
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());

        let queued = self.queued.lock().unwrap().pop_front();
        match queued {
            Some(result) => result,
            None => (self.responder)(request),
        }
    }
}
