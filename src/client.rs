//! Client facade assembling the adapter, token store, and repositories.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::models::{ContainerRepository, FileRepository, Model, ModelRepository, UserRepository};
use crate::remoting::{RemoteRepository, RestAdapter};
use crate::storage::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY};

/// Entry point for applications: one client per logical backend.
///
/// ```no_run
/// use remoting_client::RemotingClient;
///
/// # async fn example() -> remoting_client::Result<()> {
/// let client = RemotingClient::builder("http://localhost:3000").build()?;
/// let containers = client.container_repository()?;
/// let all = containers.get_all().await?;
/// # Ok(())
/// # }
/// ```
pub struct RemotingClient {
    adapter: Arc<RestAdapter>,
    token_store: Arc<dyn TokenStore>,
}

impl RemotingClient {
    pub fn builder(base_url: &str) -> RemotingClientBuilder {
        RemotingClientBuilder::new(base_url)
    }

    /// The shared adapter, for direct untyped invocation or header tweaks.
    pub fn adapter(&self) -> Arc<RestAdapter> {
        self.adapter.clone()
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        self.token_store.clone()
    }

    /// An untyped repository for an arbitrary remote class.
    pub fn repository(&self, class_name: &str) -> Result<RemoteRepository> {
        RemoteRepository::new(self.adapter.clone(), class_name)
    }

    /// A typed repository; `name_for_rest_url` is the plural path segment.
    pub fn model_repository<T: Model>(
        &self,
        class_name: &str,
        name_for_rest_url: &str,
    ) -> Result<ModelRepository<T>> {
        ModelRepository::new(self.adapter.clone(), class_name, name_for_rest_url)
    }

    pub fn user_repository(&self) -> Result<UserRepository> {
        UserRepository::new(self.adapter.clone(), self.token_store.clone())
    }

    pub fn container_repository(&self) -> Result<ContainerRepository> {
        ContainerRepository::new(self.adapter.clone())
    }

    pub fn file_repository(&self, container: &str) -> Result<FileRepository> {
        FileRepository::new(self.adapter.clone(), container)
    }
}

/// Fluent construction for [`RemotingClient`].
pub struct RemotingClientBuilder {
    base_url: String,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    token_store: Option<Arc<dyn TokenStore>>,
    access_token: Option<String>,
}

impl RemotingClientBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            user_agent: None,
            timeout: None,
            token_store: None,
            access_token: None,
        }
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the default in-memory token store, e.g. with a platform
    /// keychain implementation.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Seeds an access token (an API key or a token from a prior session).
    pub fn access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// Connects the adapter and restores any persisted token into the
    /// `Authorization` header.
    pub fn build(self) -> Result<RemotingClient> {
        let adapter = Arc::new(RestAdapter::new());
        if let Some(timeout) = self.timeout {
            adapter.set_timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            adapter.set_header("User-Agent", user_agent);
        }
        adapter.connect(&self.base_url)?;

        let token_store: Arc<dyn TokenStore> = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        if let Some(token) = &self.access_token {
            token_store.set(ACCESS_TOKEN_KEY, token);
        }
        if let Some(token) = token_store.get(ACCESS_TOKEN_KEY) {
            adapter.set_access_token(&token);
        }

        Ok(RemotingClient {
            adapter,
            token_store,
        })
    }
}
