//! `project.*` methods

use async_trait::async_trait;
use serde_json::Value;

use super::ConduitApi;
use crate::client::params::{SearchParams, build_search_params};
use crate::error::Result;

#[async_trait]
pub trait ProjectApi: ConduitApi {
    async fn search_projects(&self, search: &SearchParams) -> Result<Value> {
        self.call_method("project.search", build_search_params(search))
            .await
    }

    /// Workboard columns, e.g. constrained by `projects`
    async fn search_columns(&self, search: &SearchParams) -> Result<Value> {
        self.call_method("project.column.search", build_search_params(search))
            .await
    }
}

impl<T: ConduitApi + ?Sized> ProjectApi for T {}
