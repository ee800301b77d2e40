//! Untyped repository over a remote class.
//!
//! A [`RemoteRepository`] prefixes method names with its class name and
//! forwards invocations to the shared adapter; [`crate::RemoteObject`]s it
//! creates carry the per-instance creation parameters.

use std::sync::Arc;

use crate::error::{RemotingError, Result};
use crate::remoting::adapter::RestAdapter;
use crate::remoting::object::RemoteObject;
use crate::remoting::params::Params;
use crate::remoting::response::RemotingResponse;

/// A handle on one server-side class, identified by its class name.
#[derive(Clone)]
pub struct RemoteRepository {
    class_name: String,
    adapter: Arc<RestAdapter>,
}

impl RemoteRepository {
    pub fn new(adapter: Arc<RestAdapter>, class_name: &str) -> Result<Self> {
        if class_name.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "class name is empty".to_string(),
            ));
        }
        Ok(Self {
            class_name: class_name.to_string(),
            adapter,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn adapter(&self) -> &Arc<RestAdapter> {
        &self.adapter
    }

    /// Creates a virtual object backed by this repository. The creation
    /// parameters identify the server-side instance and are merged into
    /// every instance invocation.
    pub fn create_object(&self, creation_parameters: Params) -> RemoteObject {
        RemoteObject::new(self.clone(), creation_parameters)
    }

    /// Invokes the class-level method `"<Class>.<method>"`.
    pub async fn invoke_static(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let full_name = format!("{}.{}", self.class_name, method);
        self.adapter
            .invoke_static_method(&full_name, parameters)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_class_name_rejected() {
        let adapter = Arc::new(RestAdapter::new());
        assert!(RemoteRepository::new(adapter, "").is_err());
    }

    #[test]
    fn test_create_object_carries_creation_parameters() {
        use crate::remoting::params::params_from;
        use serde_json::json;

        let adapter = Arc::new(RestAdapter::new());
        let repository = RemoteRepository::new(adapter, "widget").unwrap();
        let object = repository.create_object(params_from(json!({ "name": "somename" })));
        assert_eq!(object.creation_parameters()["name"], json!("somename"));
    }
}
