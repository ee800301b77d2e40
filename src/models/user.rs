//! User session layer: login/logout and access-token wiring.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::model::{Model, ModelRepository};
use crate::remoting::{params_from, ContractItem, Params, RestAdapter};
use crate::storage::{TokenStore, ACCESS_TOKEN_KEY};

/// A user account on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub attributes: Params,
}

impl User {
    pub fn with_credentials(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            ..Self::default()
        }
    }
}

impl Model for User {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// The session token the server issues on login. The token value itself is
/// the `id` field; it becomes the `Authorization` header verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub ttl: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub user: Option<User>,
}

/// Typed repository for the `user` class, extended with the session
/// routes. Logging in persists the token through the [`TokenStore`] and
/// installs it on the adapter; logging out clears both.
pub struct UserRepository {
    models: ModelRepository<User>,
    store: Arc<dyn TokenStore>,
    current_user_id: RwLock<Option<String>>,
}

impl UserRepository {
    pub fn new(adapter: Arc<RestAdapter>, store: Arc<dyn TokenStore>) -> Result<Self> {
        let models = ModelRepository::new(adapter, "user", "users")?;

        // Session routes on top of the default CRUD contract.
        let adapter = models.adapter();
        adapter.add_item(
            ContractItem::new("/users/login?include=user", "POST"),
            "user.login",
        )?;
        adapter.add_item(ContractItem::new("/users/logout", "POST"), "user.logout")?;

        Ok(Self {
            models,
            store,
            current_user_id: RwLock::new(None),
        })
    }

    /// The underlying typed repository, for plain user CRUD.
    pub fn models(&self) -> &ModelRepository<User> {
        &self.models
    }

    /// Logs in and installs the issued token for all subsequent requests.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken> {
        let params = params_from(serde_json::to_value(credentials)?);
        let response = self
            .models
            .adapter()
            .invoke_static_method("user.login", &params)
            .await?;
        let token: AccessToken = response.json()?;

        self.store.set(ACCESS_TOKEN_KEY, &token.id);
        self.models.adapter().set_access_token(&token.id);
        *self.current_user_id.write() = token.user_id.clone();
        info!("Logged in as user {:?}", token.user_id);
        Ok(token)
    }

    /// Logs out on the server, then drops the token from the adapter and
    /// the store. The local credential is cleared even though the server
    /// call came first; a failed call leaves it in place for a retry.
    pub async fn logout(&self) -> Result<()> {
        self.models
            .adapter()
            .invoke_static_method("user.logout", &Params::new())
            .await?;

        self.models.adapter().clear_access_token();
        self.store.clear(ACCESS_TOKEN_KEY);
        *self.current_user_id.write() = None;
        info!("Logged out");
        Ok(())
    }

    /// The id of the user who logged in through this repository, if any.
    pub fn current_user_id(&self) -> Option<String> {
        self.current_user_id.read().clone()
    }
}
