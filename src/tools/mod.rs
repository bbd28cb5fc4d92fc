//! Tool adapter: session resolution plus error normalization
//!
//! A [`ToolRequest`] names a Conduit method, its parameters and the inbound
//! headers. [`handle`] resolves the client through the session provider,
//! makes the call and folds any failure into a [`ToolResponse`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::{RequestContext, SessionProvider};

mod response;

pub use response::{ErrorCode, ToolResponse};

/// One inbound tool call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Correlation id, echoed back in the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Conduit method, e.g. `maniphest.search`
    pub method: String,

    #[serde(default)]
    pub params: Value,

    /// Transport headers, e.g. `X-PHABRICATOR-TOKEN`
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Run one tool call. Never panics on caller errors; every failure becomes
/// an error response.
pub async fn handle(provider: &dyn SessionProvider, request: ToolRequest) -> ToolResponse {
    let ToolRequest {
        id,
        method,
        params,
        headers,
    } = request;

    let context = RequestContext::from_headers(&headers);
    let result = dispatch(provider, &context, &method, params).await;
    ToolResponse::from_result(result).with_id(id)
}

async fn dispatch(
    provider: &dyn SessionProvider,
    context: &RequestContext,
    method: &str,
    params: Value,
) -> Result<Value> {
    let client = provider.get_or_create_client(context)?;

    let method = method.trim();
    if method.is_empty() {
        return Err(Error::Other("method is required".to_string()));
    }

    client.call_method(method, params).await
}
