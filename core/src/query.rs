//! Query-string encoding for GET parameters.
//!
//! Scalars become `key=value`; nested arrays and objects are flattened with
//! bracket keys (`tags[0]=a`, `owner[name]=b`), the form the panel accepts.
//! `null` entries are left out. Booleans go over the wire as `1` / `0`.

use serde_json::Value;

use crate::types::Params;

/// Percent-encode a mapping into `k=v&k=v` form. Empty mapping → empty string.
pub fn encode_query(params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append an already-encoded query to `url`, respecting an existing `?`.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

fn flatten(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => out.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => out.push((key, number.to_string())),
        Value::String(text) => out.push((key, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{key}[{index}]"), item, out);
            }
        }
        Value::Object(fields) => {
            for (name, item) in fields {
                flatten(format!("{key}[{name}]"), item, out);
            }
        }
    }
}
