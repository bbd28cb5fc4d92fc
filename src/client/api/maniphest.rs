//! `maniphest.*` task methods

use async_trait::async_trait;
use serde_json::{Value, json};

use super::ConduitApi;
use crate::client::params::{
    SearchParams, Transaction, build_search_params, build_transaction_params,
};
use crate::error::{ApiError, Result};

/// Fields for a new task. Only the title is required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub owner_phid: Option<String>,
    pub project_phids: Vec<String>,
    pub priority: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    fn transactions(&self) -> Vec<Transaction> {
        let mut transactions = vec![Transaction::title(&self.title)];

        if let Some(ref description) = self.description
            && !description.is_empty()
        {
            transactions.push(Transaction::description(description));
        }
        if let Some(ref owner) = self.owner_phid {
            transactions.push(Transaction::owner(owner));
        }
        if !self.project_phids.is_empty() {
            let phids: Vec<&str> = self.project_phids.iter().map(String::as_str).collect();
            transactions.push(Transaction::set_projects(&phids));
        }
        if let Some(ref priority) = self.priority {
            transactions.push(Transaction::priority(priority));
        }
        transactions
    }
}

#[async_trait]
pub trait ManiphestApi: ConduitApi {
    async fn search_tasks(&self, search: &SearchParams) -> Result<Value> {
        self.call_method("maniphest.search", build_search_params(search))
            .await
    }

    /// Fetch one task by numeric ID
    async fn get_task(&self, task_id: u64) -> Result<Value> {
        let search = SearchParams::new()
            .constraint("ids", json!([task_id]))
            .limit(1);
        let result = self.search_tasks(&search).await?;

        result
            .get("data")
            .and_then(|d| d.get(0))
            .cloned()
            .ok_or_else(|| {
                ApiError::Remote {
                    code: "ERR-NOT-FOUND".to_string(),
                    info: format!("Task {} not found", task_id),
                }
                .into()
            })
    }

    async fn create_task(&self, task: &NewTask) -> Result<Value> {
        self.call_method(
            "maniphest.edit",
            build_transaction_params(&task.transactions(), None),
        )
        .await
    }

    /// Apply transactions to an existing task (`T123`, `123` or a PHID)
    async fn edit_task(
        &self,
        object_identifier: &str,
        transactions: &[Transaction],
    ) -> Result<Value> {
        self.call_method(
            "maniphest.edit",
            build_transaction_params(transactions, Some(object_identifier)),
        )
        .await
    }

    async fn add_comment(&self, object_identifier: &str, comment: &str) -> Result<Value> {
        self.edit_task(object_identifier, &[Transaction::comment(comment)])
            .await
    }
}

impl<T: ConduitApi + ?Sized> ManiphestApi for T {}
