//! Storage containers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::remoting::{params_from, ContractItem, Params, RemoteRepository, RestAdapter};

/// A named storage container holding uploaded files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(flatten)]
    pub attributes: Params,
}

/// Repository for the `container` class. Containers are keyed by name, not
/// id, so this sits on the untyped repository rather than
/// [`crate::ModelRepository`].
pub struct ContainerRepository {
    repository: RemoteRepository,
}

impl ContainerRepository {
    pub fn new(adapter: Arc<RestAdapter>) -> Result<Self> {
        adapter.add_item(ContractItem::new("/containers", "POST"), "container.create")?;
        adapter.add_item(ContractItem::new("/containers", "GET"), "container.getAll")?;
        adapter.add_item(ContractItem::new("/containers/:name", "GET"), "container.get")?;
        adapter.add_item(
            ContractItem::new("/containers/:name", "DELETE"),
            "container.prototype.remove",
        )?;

        Ok(Self {
            repository: RemoteRepository::new(adapter, "container")?,
        })
    }

    /// Creates a container; the name must be unique on the server.
    pub async fn create(&self, name: &str) -> Result<Container> {
        let params = params_from(serde_json::json!({ "name": name }));
        let response = self.repository.invoke_static("create", &params).await?;
        response.json()
    }

    pub async fn get(&self, name: &str) -> Result<Container> {
        let params = params_from(serde_json::json!({ "name": name }));
        let response = self.repository.invoke_static("get", &params).await?;
        response.json()
    }

    pub async fn get_all(&self) -> Result<Vec<Container>> {
        let response = self.repository.invoke_static("getAll", &Params::new()).await?;
        response.json()
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        let creation = params_from(serde_json::json!({ "name": name }));
        self.repository
            .create_object(creation)
            .invoke_method("remove", &Params::new())
            .await?;
        Ok(())
    }
}
