//! Conduit endpoint wrappers split by application
//!
//! Every wrapper is a thin mapping onto [`ConduitApi::call_method`]:
//! - [`MetaApi`] - `conduit.*` introspection
//! - [`UserApi`] - `user.*`
//! - [`ManiphestApi`] - `maniphest.*` tasks
//! - [`ProjectApi`] - `project.*`
//! - [`PhidApi`] - `phid.*` lookups
//!
//! The sub-traits have blanket impls, so anything implementing
//! [`ConduitApi`] gets the whole surface.

use async_trait::async_trait;
use serde_json::Value;

use super::ConduitClient;
use crate::error::Result;

mod maniphest;
mod meta;
mod phid;
mod project;
mod user;

pub use maniphest::{ManiphestApi, NewTask};
pub use meta::MetaApi;
pub use phid::PhidApi;
pub use project::ProjectApi;
pub use user::{UserApi, WhoAmI};

/// Raw Conduit method invocation
#[async_trait]
pub trait ConduitApi: Send + Sync {
    async fn call_method(&self, method: &str, params: Value) -> Result<Value>;
}

#[async_trait]
impl ConduitApi for ConduitClient {
    async fn call_method(&self, method: &str, params: Value) -> Result<Value> {
        ConduitClient::call_method(self, method, params).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every call and answers with a fixed value
    pub struct RecordingApi {
        pub response: Value,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingApi {
        pub fn new(response: Value) -> Self {
            Self {
                response,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn last_call(&self) -> (String, Value) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ConduitApi for RecordingApi {
        async fn call_method(&self, method: &str, params: Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            Ok(self.response.clone())
        }
    }
}
