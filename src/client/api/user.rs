//! `user.*` methods

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ConduitApi;
use crate::client::params::{SearchParams, build_search_params};
use crate::error::Result;

/// The account behind the current token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub phid: String,
    pub user_name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[async_trait]
pub trait UserApi: ConduitApi {
    async fn whoami(&self) -> Result<WhoAmI> {
        let data = self.call_method("user.whoami", json!({})).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn search_users(&self, search: &SearchParams) -> Result<Value> {
        self.call_method("user.search", build_search_params(search))
            .await
    }
}

impl<T: ConduitApi + ?Sized> UserApi for T {}
