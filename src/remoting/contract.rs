//! Remote Method Contracts
//!
//! A contract maps logical method names (`"widget.create"`,
//! `"widget.prototype.save"`) to concrete routes: a URL pattern with
//! `:name` placeholders, an HTTP verb, and a parameter encoding. Methods
//! without a registered route fall back to a deterministic default derived
//! from the method name itself.

use std::collections::HashMap;

use crate::error::{RemotingError, Result};
use crate::remoting::params::{stringify_leaf, Params};

/// How call parameters are serialized into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// `application/x-www-form-urlencoded` body of flattened pairs.
    FormUrl,
    /// JSON object body. The default.
    Json,
    /// `multipart/form-data` body; used by file upload routes.
    Multipart,
}

/// One route definition: URL pattern, HTTP verb, parameter encoding.
///
/// Immutable once constructed. A single item may be registered under
/// several method names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractItem {
    pattern: String,
    verb: String,
    encoding: ParameterEncoding,
}

impl ContractItem {
    /// Creates an item with the default JSON parameter encoding.
    pub fn new(pattern: impl Into<String>, verb: impl Into<String>) -> Self {
        Self::with_encoding(pattern, verb, ParameterEncoding::Json)
    }

    /// Creates an item with an explicit parameter encoding.
    pub fn with_encoding(
        pattern: impl Into<String>,
        verb: impl Into<String>,
        encoding: ParameterEncoding,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            verb: verb.into(),
            encoding,
        }
    }

    /// Creates a multipart item for upload routes.
    pub fn multipart(pattern: impl Into<String>, verb: impl Into<String>) -> Self {
        Self::with_encoding(pattern, verb, ParameterEncoding::Multipart)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn encoding(&self) -> ParameterEncoding {
        self.encoding
    }
}

/// Mapping from logical method name to [`ContractItem`].
///
/// Populated additively; the last registration for a name wins. Lives for
/// the owning adapter's lifetime and is never removed from.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    items: HashMap<String, ContractItem>,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `item` under `method_name`, overwriting any existing entry.
    pub fn add_item(&mut self, item: ContractItem, method_name: &str) -> Result<()> {
        if method_name.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "method name is empty".to_string(),
            ));
        }
        self.items.insert(method_name.to_string(), item);
        Ok(())
    }

    /// Merges all entries of `other` into this contract.
    ///
    /// On key collision the entry from `other` wins. Used to layer a model
    /// repository's routes on top of an adapter's shared contract.
    pub fn add_items_from_contract(&mut self, other: &Contract) {
        for (name, item) in &other.items {
            self.items.insert(name.clone(), item.clone());
        }
    }

    /// The registered verb for a method, or `"POST"` if unregistered.
    pub fn verb_for_method(&self, method_name: &str) -> Result<&str> {
        if method_name.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "method name is empty".to_string(),
            ));
        }
        Ok(self
            .items
            .get(method_name)
            .map(|item| item.verb.as_str())
            .unwrap_or("POST"))
    }

    /// The registered encoding for a method, or [`ParameterEncoding::Json`]
    /// if unregistered.
    pub fn parameter_encoding_for_method(&self, method_name: &str) -> Result<ParameterEncoding> {
        if method_name.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "method name is empty".to_string(),
            ));
        }
        Ok(self
            .items
            .get(method_name)
            .map(|item| item.encoding)
            .unwrap_or(ParameterEncoding::Json))
    }

    /// The registered URL pattern for a method, if any.
    pub fn pattern_for_method(&self, method_name: &str) -> Option<&str> {
        self.items.get(method_name).map(|item| item.pattern.as_str())
    }

    /// Resolves the path for a method.
    ///
    /// With a registered pattern, every `:name` placeholder is substituted
    /// by the stringified parameter of that name; parameters without a
    /// matching placeholder are left for the query/body step. A placeholder
    /// with no matching parameter is rejected rather than sent verbatim to
    /// the server. Without a registered pattern, falls back to
    /// [`Contract::url_for_method_without_item`].
    pub fn url_for_method(&self, method_name: &str, params: &Params) -> Result<String> {
        Ok(self.resolve_url(method_name, params)?.0)
    }

    /// Like [`Contract::url_for_method`], but also reports which parameter
    /// keys were consumed by placeholder substitution so the caller can
    /// drop them from the remaining parameter set.
    pub fn resolve_url(
        &self,
        method_name: &str,
        params: &Params,
    ) -> Result<(String, Vec<String>)> {
        if method_name.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "method name is empty".to_string(),
            ));
        }
        match self.pattern_for_method(method_name) {
            Some(pattern) => substitute_placeholders(pattern, params),
            None => Ok((Self::url_for_method_without_item(method_name), Vec::new())),
        }
    }

    /// The contract-free default route: every `.` becomes `/`.
    pub fn url_for_method_without_item(method_name: &str) -> String {
        method_name.replace('.', "/")
    }
}

/// Replaces each `:name` token in `pattern` with the stringified parameter
/// of that name, returning the resolved path and the consumed keys.
///
/// A placeholder name is `[A-Za-z_][A-Za-z0-9_]*`, matched greedily, so
/// `:id` never clips `:idx`. A `:` not followed by a name character passes
/// through untouched.
fn substitute_placeholders(pattern: &str, params: &Params) -> Result<(String, Vec<String>)> {
    let mut resolved = String::with_capacity(pattern.len());
    let mut consumed = Vec::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find(':') {
        resolved.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let bytes = after.as_bytes();
        let mut len = 0;
        while len < bytes.len() {
            let b = bytes[len];
            let is_name_byte = if len == 0 {
                b.is_ascii_alphabetic() || b == b'_'
            } else {
                b.is_ascii_alphanumeric() || b == b'_'
            };
            if !is_name_byte {
                break;
            }
            len += 1;
        }
        if len == 0 {
            resolved.push(':');
            rest = after;
            continue;
        }
        let name = &after[..len];
        match params.get(name) {
            Some(value) => {
                resolved.push_str(&stringify_leaf(value));
                consumed.push(name.to_string());
            }
            None => {
                return Err(RemotingError::InvalidArgument(format!(
                    "no parameter supplies placeholder ':{}' in pattern '{}'",
                    name, pattern
                )));
            }
        }
        rest = &after[len..];
    }
    resolved.push_str(rest);
    Ok((resolved, consumed))
}
