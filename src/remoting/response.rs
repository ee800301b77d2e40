//! Invocation Results
//!
//! A successful remote invocation yields a [`RemotingResponse`] carrying
//! the HTTP status and the response content, either as text or as raw
//! bytes with their declared content type. Failures never reach this type;
//! they surface as [`crate::RemotingError`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RemotingError, Result};

/// Result of one remote invocation. Created per call, not cached.
#[derive(Debug, Clone)]
pub struct RemotingResponse {
    status: u16,
    text: Option<String>,
    binary: Option<(Vec<u8>, String)>,
}

impl RemotingResponse {
    /// Wraps a text (usually JSON) response body.
    pub fn from_text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: Some(text.into()),
            binary: None,
        }
    }

    /// Wraps a binary response body with its declared content type.
    pub fn from_binary(status: u16, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            status,
            text: None,
            binary: Some((bytes, content_type.into())),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.binary.as_ref().map(|(bytes, _)| bytes.as_slice())
    }

    /// Content type of a binary response body.
    pub fn content_type(&self) -> Option<&str> {
        self.binary.as_ref().map(|(_, ct)| ct.as_str())
    }

    /// Parses the text content as an arbitrary JSON value.
    pub fn json_value(&self) -> Result<Value> {
        Ok(serde_json::from_str(self.require_text()?)?)
    }

    /// Deserializes the text content into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(self.require_text()?)?)
    }

    fn require_text(&self) -> Result<&str> {
        self.text.as_deref().ok_or_else(|| {
            RemotingError::UnexpectedResponse("response has no text content".to_string())
        })
    }
}
