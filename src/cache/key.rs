//! Cache key generation using SHA-256 hashes

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::client::HttpRequest;

/// Separator between key components. Never produced by `canonicalize` for
/// the method or the partition, and hashed anyway.
const SEPARATOR: &[u8] = b"|";

/// Options outside method, URL and body that still change the response.
#[derive(Debug, Serialize)]
struct ExtraOptions<'a> {
    headers: &'a std::collections::BTreeMap<String, String>,
    timeout_ms: Option<u64>,
}

/// Stable string form of any serializable value.
///
/// Objects are emitted with keys sorted at every depth, so logically equal
/// maps produce the same string regardless of insertion order. Strings are
/// emitted bare, `null` as the empty string. If the value cannot be
/// serialized, its `Debug` form is used instead.
pub fn canonicalize<T: Serialize + fmt::Debug + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::Null) => String::new(),
        Ok(Value::String(s)) => s,
        Ok(v @ (Value::Bool(_) | Value::Number(_))) => v.to_string(),
        Ok(v) => sort_keys(v).to_string(),
        Err(err) => {
            log::debug!("Cache key component not serializable ({}), using debug form", err);
            format!("{:?}", value)
        }
    }
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Derive the cache key for a request.
///
/// The key is a SHA-256 hash over the method, URL, query, form body, JSON
/// payload, extra options and the session `partition`. Keys from different
/// partitions never collide, so a cache shared between tokens stays isolated.
pub fn derive_cache_key(request: &HttpRequest, partition: &str) -> String {
    let extra = ExtraOptions {
        headers: &request.headers,
        timeout_ms: request
            .timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
    };

    let parts = [
        request.method.as_str().to_uppercase(),
        request.url.clone(),
        canonicalize(&request.query),
        canonicalize(&request.form),
        match request.json {
            // Absent body and an explicit `null` body differ on the wire
            Some(ref json) => format!("json:{}", canonicalize(json)),
            None => String::new(),
        },
        canonicalize(&extra),
        partition.to_string(),
    ];

    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(SEPARATOR);
        }
        hasher.update(part.as_bytes());
    }

    // Return hex-encoded hash
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    const URL: &str = "https://phab.example.com/api/project.search";

    #[test]
    fn test_canonicalize_scalars() {
        assert_eq!(canonicalize(&Value::Null), "");
        assert_eq!(canonicalize(&None::<String>), "");
        assert_eq!(canonicalize("abc"), "abc");
        assert_eq!(canonicalize(&42), "42");
        assert_eq!(canonicalize(&true), "true");
    }

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let a = json!({"b": 1, "a": {"y": [1, 2], "x": null}});
        let b = json!({"a": {"x": null, "y": [1, 2]}, "b": 1});
        assert_eq!(canonicalize(&a), canonicalize(&b));
        assert_eq!(canonicalize(&a), r#"{"a":{"x":null,"y":[1,2]},"b":1}"#);
    }

    #[test]
    fn test_canonicalize_hashmap_insertion_order() {
        let mut first = HashMap::new();
        first.insert("limit", "10");
        first.insert("queryKey", "active");
        first.insert("after", "1234");

        let mut second = HashMap::new();
        second.insert("after", "1234");
        second.insert("queryKey", "active");
        second.insert("limit", "10");

        assert_eq!(canonicalize(&first), canonicalize(&second));
    }

    #[test]
    fn test_canonicalize_falls_back_on_serialization_failure() {
        // Tuple keys cannot become JSON object keys
        let mut map = HashMap::new();
        map.insert((1, 2), "value");

        let canonical = canonicalize(&map);
        assert!(canonical.contains("value"));
        assert!(canonical.contains("(1, 2)"));
    }

    #[test]
    fn test_key_deterministic() {
        let key1 = derive_cache_key(
            &HttpRequest::get(URL).query("limit", "10").query("page", "1"),
            "p",
        );
        let key2 = derive_cache_key(
            &HttpRequest::get(URL).query("page", "1").query("limit", "10"),
            "p",
        );

        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 64);
    }

    #[test]
    fn test_key_json_payload_order_independent() {
        let key1 = derive_cache_key(
            &HttpRequest::get(URL).json(json!({"constraints": {"ids": [1], "name": "x"}})),
            "p",
        );
        let key2 = derive_cache_key(
            &HttpRequest::get(URL).json(json!({"constraints": {"name": "x", "ids": [1]}})),
            "p",
        );
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_different_methods() {
        let get = derive_cache_key(&HttpRequest::get(URL).form("limit", "10"), "p");
        let post = derive_cache_key(&HttpRequest::post(URL).form("limit", "10"), "p");
        assert_ne!(get, post);
    }

    #[test]
    fn test_key_method_case_does_not_matter() {
        let lower = derive_cache_key(&HttpRequest::new("get", URL).unwrap(), "p");
        let upper = derive_cache_key(&HttpRequest::new("GET", URL).unwrap(), "p");
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_key_different_urls() {
        let key1 = derive_cache_key(&HttpRequest::get(URL), "p");
        let key2 = derive_cache_key(
            &HttpRequest::get("https://phab.example.com/api/user.search"),
            "p",
        );
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_key_different_param_values() {
        let key1 = derive_cache_key(&HttpRequest::get(URL).query("limit", "10"), "p");
        let key2 = derive_cache_key(&HttpRequest::get(URL).query("limit", "11"), "p");
        let key3 = derive_cache_key(&HttpRequest::get(URL).form("limit", "10"), "p");
        assert_ne!(key1, key2);
        assert_ne!(key1, key3);
    }

    #[test]
    fn test_key_includes_headers_and_timeout() {
        let base = derive_cache_key(&HttpRequest::get(URL), "p");
        let with_header = derive_cache_key(&HttpRequest::get(URL).header("Accept", "text/plain"), "p");
        let with_timeout =
            derive_cache_key(&HttpRequest::get(URL).timeout(Duration::from_secs(5)), "p");
        assert_ne!(base, with_header);
        assert_ne!(base, with_timeout);
    }

    #[test]
    fn test_key_null_body_differs_from_no_body() {
        let none = derive_cache_key(&HttpRequest::get(URL), "p");
        let null = derive_cache_key(&HttpRequest::get(URL).json(Value::Null), "p");
        let empty = derive_cache_key(&HttpRequest::get(URL).json(json!("")), "p");
        assert_ne!(none, null);
        assert_ne!(none, empty);
    }

    #[test]
    fn test_key_huge_timeout_saturates() {
        let huge = derive_cache_key(&HttpRequest::get(URL).timeout(Duration::MAX), "p");
        let same = derive_cache_key(&HttpRequest::get(URL).timeout(Duration::MAX), "p");
        let small = derive_cache_key(&HttpRequest::get(URL).timeout(Duration::from_secs(5)), "p");
        assert_eq!(huge, same);
        assert_ne!(huge, small);
    }

    #[test]
    fn test_key_partitioned_by_session() {
        let key1 = derive_cache_key(&HttpRequest::get(URL), "token-a");
        let key2 = derive_cache_key(&HttpRequest::get(URL), "token-b");
        assert_ne!(key1, key2);
    }
}
