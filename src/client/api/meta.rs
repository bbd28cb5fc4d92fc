//! `conduit.*` introspection methods

use async_trait::async_trait;
use serde_json::{Value, json};

use super::ConduitApi;
use crate::error::Result;

#[async_trait]
pub trait MetaApi: ConduitApi {
    /// Cheap round trip that checks URL and token
    async fn ping(&self) -> Result<Value> {
        self.call_method("conduit.ping", json!({})).await
    }

    async fn capabilities(&self) -> Result<Value> {
        self.call_method("conduit.getcapabilities", json!({})).await
    }

    /// Every method the server exposes, with parameter signatures
    async fn query_methods(&self) -> Result<Value> {
        self.call_method("conduit.query", json!({})).await
    }
}

impl<T: ConduitApi + ?Sized> MetaApi for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::testing::RecordingApi;

    #[tokio::test]
    async fn test_meta_methods() {
        let api = RecordingApi::new(json!("pong"));

        assert_eq!(api.ping().await.unwrap(), json!("pong"));
        assert_eq!(api.last_call(), ("conduit.ping".to_string(), json!({})));

        api.capabilities().await.unwrap();
        assert_eq!(api.last_call().0, "conduit.getcapabilities");

        api.query_methods().await.unwrap();
        assert_eq!(api.last_call().0, "conduit.query");
    }
}
