//! One-shot Conduit calls: `whoami`, `ping`, `call`

use serde::Serialize;
use serde_json::{Map, Value};

use conduit_mcp::client::api::{MetaApi, UserApi};
use conduit_mcp::error::{Error, Result};

use crate::cli::{CommandContext, GlobalOptions};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn whoami(opts: &GlobalOptions) -> Result<()> {
    let client = CommandContext::new(opts, true)?.client()?;
    print_json(&client.whoami().await?)
}

pub async fn ping(opts: &GlobalOptions) -> Result<()> {
    let client = CommandContext::new(opts, true)?.client()?;
    print_json(&client.ping().await?)
}

/// Call `method` with either `key=value` pairs or a JSON object
pub async fn call(
    opts: &GlobalOptions,
    method: &str,
    params: &[(String, String)],
    json: Option<&str>,
) -> Result<()> {
    let params = build_params(params, json)?;
    let client = CommandContext::new(opts, true)?.client()?;
    print_json(&client.call_method(method, params).await?)
}

fn build_params(pairs: &[(String, String)], json: Option<&str>) -> Result<Value> {
    if let Some(raw) = json {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(Error::Other("--json must be a JSON object".to_string()));
        }
        return Ok(value);
    }

    let map: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Ok(Value::Object(map))
}
