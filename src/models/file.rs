//! Files within a storage container: metadata, upload, download.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RemotingError, Result};
use crate::remoting::{params_from, ContractItem, Params, RestAdapter, StreamParam};

/// Metadata for one stored file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub attributes: Params,
}

/// Repository for the `file` class, scoped to one container.
///
/// Uploads buffer their bytes and go out as multipart form data; downloads
/// come back as raw bytes with the server's declared content type.
pub struct FileRepository {
    adapter: Arc<RestAdapter>,
    container: String,
}

impl FileRepository {
    pub fn new(adapter: Arc<RestAdapter>, container: &str) -> Result<Self> {
        if container.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "container name is empty".to_string(),
            ));
        }

        const BASE: &str = "/containers/:container";
        adapter.add_item(
            ContractItem::new(format!("{}/files", BASE), "GET"),
            "file.getAll",
        )?;
        adapter.add_item(
            ContractItem::new(format!("{}/files/:name", BASE), "GET"),
            "file.get",
        )?;
        adapter.add_item(
            ContractItem::multipart(format!("{}/upload", BASE), "POST"),
            "file.upload",
        )?;
        adapter.add_item(
            ContractItem::new(format!("{}/download/:name", BASE), "GET"),
            "file.prototype.download",
        )?;
        adapter.add_item(
            ContractItem::new(format!("{}/files/:name", BASE), "DELETE"),
            "file.prototype.delete",
        )?;

        Ok(Self {
            adapter,
            container: container.to_string(),
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    fn scope(&self) -> Params {
        params_from(serde_json::json!({ "container": self.container }))
    }

    pub async fn get_all(&self) -> Result<Vec<FileMeta>> {
        let response = self
            .adapter
            .invoke_static_method("file.getAll", &self.scope())
            .await?;
        response.json()
    }

    pub async fn get(&self, name: &str) -> Result<FileMeta> {
        let mut params = self.scope();
        params.insert("name".to_string(), serde_json::json!(name));
        let response = self.adapter.invoke_static_method("file.get", &params).await?;
        response.json()
    }

    /// Uploads `bytes` as a new file named `name`.
    pub async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<FileMeta> {
        debug!("Uploading {} ({} bytes) to {}", name, bytes.len(), self.container);
        let stream = StreamParam::new("file", name, content_type, bytes);
        let response = self
            .adapter
            .invoke_static_method_multipart("file.upload", &self.scope(), vec![stream])
            .await?;
        response.json()
    }

    /// Downloads a file's bytes along with their declared content type.
    pub async fn download(&self, name: &str) -> Result<(Vec<u8>, String)> {
        let mut ctor = self.scope();
        ctor.insert("name".to_string(), serde_json::json!(name));
        let response = self
            .adapter
            .invoke_instance_method_binary("file.prototype.download", &ctor, &Params::new())
            .await?;

        let bytes = response.bytes().map(<[u8]>::to_vec).ok_or_else(|| {
            RemotingError::UnexpectedResponse("download returned no content".to_string())
        })?;
        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok((bytes, content_type))
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut ctor = self.scope();
        ctor.insert("name".to_string(), serde_json::json!(name));
        self.adapter
            .invoke_instance_method("file.prototype.delete", &ctor, &Params::new())
            .await?;
        Ok(())
    }
}
