//! Conduit parameter shaping
//!
//! Conduit takes form-encoded parameters where nested structures are spelled
//! out as `constraints[ids][0]=12`. Builders here produce nested JSON; the
//! client flattens it right before sending.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Default page size for `*.search` endpoints
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// Flatten a JSON value into Conduit form pairs.
///
/// Objects become `prefix[key]`, arrays `prefix[index]`. Booleans render as
/// `true`/`false`, `null` as the empty string.
pub fn flatten_params(value: &Value, prefix: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(value, prefix, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}[{}]", prefix, k)
                };
                flatten_into(v, &key, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(v, &format!("{}[{}]", prefix, i), out);
            }
        }
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// Arguments shared by every `*.search` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Builtin query, e.g. `active`, `open`, `all`
    pub query_key: Option<String>,
    #[serde(default)]
    pub constraints: Map<String, Value>,
    #[serde(default)]
    pub attachments: Map<String, Value>,
    /// Builtin order key or list of columns
    pub order: Option<Value>,
    /// Cursor for the previous page
    pub before: Option<String>,
    /// Cursor for the next page
    pub after: Option<String>,
    pub limit: Option<u32>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_key(mut self, key: impl Into<String>) -> Self {
        self.query_key = Some(key.into());
        self
    }

    pub fn constraint(mut self, name: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(name.into(), value);
        self
    }

    pub fn attachment(mut self, name: impl Into<String>) -> Self {
        self.attachments.insert(name.into(), Value::Bool(true));
        self
    }

    pub fn order(mut self, order: Value) -> Self {
        self.order = Some(order);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Build the parameter object for a `*.search` call
pub fn build_search_params(search: &SearchParams) -> Value {
    let mut params = Map::new();
    params.insert(
        "limit".to_string(),
        json!(search.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
    );

    if let Some(ref key) = search.query_key
        && !key.is_empty()
    {
        params.insert("queryKey".to_string(), json!(key));
    }
    if !search.constraints.is_empty() {
        params.insert(
            "constraints".to_string(),
            Value::Object(search.constraints.clone()),
        );
    }
    if !search.attachments.is_empty() {
        params.insert(
            "attachments".to_string(),
            Value::Object(search.attachments.clone()),
        );
    }
    if let Some(ref order) = search.order {
        params.insert("order".to_string(), order.clone());
    }
    if let Some(ref before) = search.before {
        params.insert("before".to_string(), json!(before));
    }
    if let Some(ref after) = search.after {
        params.insert("after".to_string(), json!(after));
    }

    Value::Object(params)
}

/// One edit transaction for a `*.edit` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl Transaction {
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }

    pub fn title(title: &str) -> Self {
        Self::new("title", json!(title))
    }

    pub fn description(description: &str) -> Self {
        Self::new("description", json!(description))
    }

    pub fn comment(comment: &str) -> Self {
        Self::new("comment", json!(comment))
    }

    pub fn status(status: &str) -> Self {
        Self::new("status", json!(status))
    }

    pub fn priority(priority: &str) -> Self {
        Self::new("priority", json!(priority))
    }

    pub fn owner(user_phid: &str) -> Self {
        Self::new("owner", json!(user_phid))
    }

    pub fn add_projects(project_phids: &[&str]) -> Self {
        Self::new("projects.add", json!(project_phids))
    }

    pub fn set_projects(project_phids: &[&str]) -> Self {
        Self::new("projects.set", json!(project_phids))
    }
}

/// Build the parameter object for a `*.edit` call.
///
/// Without `object_identifier` the edit creates a new object.
pub fn build_transaction_params(
    transactions: &[Transaction],
    object_identifier: Option<&str>,
) -> Value {
    let mut params = Map::new();
    if !transactions.is_empty() {
        params.insert("transactions".to_string(), json!(transactions));
    }
    if let Some(id) = object_identifier {
        params.insert("objectIdentifier".to_string(), json!(id));
    }
    Value::Object(params)
}
