//! Dynamic Parameter Maps
//!
//! Remote methods take their arguments as JSON object maps. This module
//! provides the map alias used across the crate, merge semantics for
//! combining creation parameters with call parameters, and the recursive
//! flattening that turns nested maps into bracket-notation key/value pairs
//! for query strings and form bodies.

use serde_json::{Map, Value};

/// Parameter map passed to remote invocations.
///
/// Keys are parameter names; values are arbitrary JSON. Nested objects are
/// flattened with bracket notation (`where[age][gt]`) when a request
/// serializes them into a query string or form body.
pub type Params = Map<String, Value>;

/// Builds a [`Params`] map from a `serde_json::json!` object literal.
///
/// # Example
///
/// ```
/// use remoting_client::params_from;
/// use serde_json::json;
///
/// let params = params_from(json!({ "name": "widget", "count": 3 }));
/// assert_eq!(params.len(), 2);
/// ```
///
/// Anything other than a JSON object yields an empty map.
pub fn params_from(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Merges two parameter maps; `overrides` wins on key collision.
///
/// Used to combine a remote object's creation parameters with per-call
/// parameters before URL resolution.
pub fn merge_params(base: &Params, overrides: &Params) -> Params {
    let mut combined = base.clone();
    combined.extend(overrides.clone());
    combined
}

/// Recursively flattens a nested parameter map into bracket-notation pairs.
///
/// Each leaf becomes one `(key, value)` pair. A nested map under key `k`
/// with prefix `p` contributes its own leaves under `p[k]`, to unbounded
/// depth. Empty nested maps contribute nothing. Values stay as JSON here;
/// stringification happens at serialization time via [`stringify_leaf`].
pub fn flatten_parameters(prefix: Option<&str>, params: &Params) -> Vec<(String, Value)> {
    let mut flattened = Vec::new();
    for (key, value) in params {
        let effective_key = match prefix {
            Some(prefix) => format!("{}[{}]", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => {
                flattened.extend(flatten_parameters(Some(&effective_key), nested));
            }
            _ => flattened.push((effective_key, value.clone())),
        }
    }
    flattened
}

/// Flattens a parameter map straight to stringified pairs.
///
/// This is the form consumed by query-string and form-body encoding.
pub fn flatten_to_strings(params: &Params) -> Vec<(String, String)> {
    flatten_parameters(None, params)
        .into_iter()
        .map(|(key, value)| (key, stringify_leaf(&value)))
        .collect()
}

/// Renders a leaf value as its wire string.
///
/// Strings render bare (no surrounding quotes), numbers and booleans as
/// their JSON text, null as `"null"`, and arrays as compact JSON text.
pub fn stringify_leaf(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
