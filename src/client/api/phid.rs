//! `phid.*` methods

use async_trait::async_trait;
use serde_json::{Value, json};

use super::ConduitApi;
use crate::error::Result;

#[async_trait]
pub trait PhidApi: ConduitApi {
    /// Resolve monograms and names such as `T123`, `D45`, `@alice` to objects
    async fn lookup_names(&self, names: &[&str]) -> Result<Value> {
        self.call_method("phid.lookup", json!({ "names": names }))
            .await
    }

    async fn query_phids(&self, phids: &[&str]) -> Result<Value> {
        self.call_method("phid.query", json!({ "phids": phids }))
            .await
    }
}

impl<T: ConduitApi + ?Sized> PhidApi for T {}
