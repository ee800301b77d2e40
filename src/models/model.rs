//! Models and the generic typed repository.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{RemotingError, Result};
use crate::remoting::{params_from, Contract, ContractItem, Params, RestAdapter};

/// A local representative of a single model instance on the server.
///
/// The serde bounds are the whole mapping story: a model serializes to the
/// parameter map sent to the server and deserializes from the response
/// body. The id accessors let the repository route `save` between create
/// and update and clear the id after `remove`.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: Option<String>);
}

/// Schema-less model: an id, server-managed timestamps, and an open
/// attribute map for everything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Params,
}

impl ModelBase {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }
}

impl Model for ModelBase {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

/// Typed CRUD repository for one model class.
///
/// Construction installs the class's default routes into the adapter's
/// shared contract (`/plural`, `/plural/:id`); a derived repository can
/// layer custom routes on top afterwards, later registrations winning.
pub struct ModelRepository<T> {
    class_name: String,
    base_path: String,
    adapter: Arc<RestAdapter>,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> ModelRepository<T> {
    /// `name_for_rest_url` is the path segment for the class, usually the
    /// plural of `class_name`. Supplied explicitly; there is no inflection.
    pub fn new(
        adapter: Arc<RestAdapter>,
        class_name: &str,
        name_for_rest_url: &str,
    ) -> Result<Self> {
        if class_name.is_empty() || name_for_rest_url.is_empty() {
            return Err(RemotingError::InvalidArgument(
                "class name and REST url name must not be empty".to_string(),
            ));
        }
        let base_path = format!("/{}", name_for_rest_url.trim_start_matches('/'));
        let repository = Self {
            class_name: class_name.to_string(),
            base_path,
            adapter,
            _model: PhantomData,
        };
        let contract = repository.create_contract()?;
        repository.adapter.add_items_from_contract(&contract);
        Ok(repository)
    }

    /// The class's default CRUD routes.
    fn create_contract(&self) -> Result<Contract> {
        let mut contract = Contract::new();
        let base = &self.base_path;
        let item_path = format!("{}/:id", base);

        contract.add_item(
            ContractItem::new(base.clone(), "POST"),
            &self.method("prototype.create"),
        )?;
        contract.add_item(
            ContractItem::new(item_path.clone(), "PUT"),
            &self.method("prototype.save"),
        )?;
        contract.add_item(
            ContractItem::new(item_path.clone(), "DELETE"),
            &self.method("prototype.remove"),
        )?;
        contract.add_item(ContractItem::new(item_path, "GET"), &self.method("findById"))?;
        contract.add_item(ContractItem::new(base.clone(), "GET"), &self.method("all"))?;
        Ok(contract)
    }

    fn method(&self, suffix: &str) -> String {
        format!("{}.{}", self.class_name, suffix)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn adapter(&self) -> &Arc<RestAdapter> {
        &self.adapter
    }

    /// Builds a typed model from a creation-parameter map. This is the
    /// explicit factory that replaces reflective population: the map is a
    /// JSON object and `T` deserializes from it.
    pub fn create_object(&self, creation_parameters: Params) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(creation_parameters))?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<T> {
        let params = params_from(serde_json::json!({ "id": id }));
        let response = self
            .adapter
            .invoke_static_method(&self.method("findById"), &params)
            .await?;
        response.json()
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        let response = self
            .adapter
            .invoke_static_method(&self.method("all"), &Params::new())
            .await?;
        response.json()
    }

    /// Saves the model, creating it when it has no id yet and updating it
    /// otherwise. Returns the stored model as the server reports it, with
    /// fields the response omits retained from the request.
    pub async fn save(&self, model: &T) -> Result<T> {
        let mut fields = self.serialize_model(model)?;
        let response = match model.id() {
            None => {
                debug!("Creating new {} instance", self.class_name);
                self.adapter
                    .invoke_static_method(&self.method("prototype.create"), &fields)
                    .await?
            }
            Some(id) => {
                debug!("Saving {} instance {}", self.class_name, id);
                let ctor = params_from(serde_json::json!({ "id": id }));
                fields.remove("id");
                self.adapter
                    .invoke_instance_method(&self.method("prototype.save"), &ctor, &fields)
                    .await?
            }
        };

        let mut stored = self.serialize_model(model)?;
        match response.json_value()? {
            Value::Object(body) => stored.extend(body),
            other => {
                return Err(RemotingError::UnexpectedResponse(format!(
                    "expected a JSON object for a saved {}, got {}",
                    self.class_name, other
                )))
            }
        }
        Ok(serde_json::from_value(Value::Object(stored))?)
    }

    /// Removes the model from the server and clears its id on success.
    pub async fn remove(&self, model: &mut T) -> Result<()> {
        let id = model.id().ok_or_else(|| {
            RemotingError::InvalidArgument(format!(
                "cannot remove a {} that has no id",
                self.class_name
            ))
        })?;
        let ctor = params_from(serde_json::json!({ "id": id }));
        self.adapter
            .invoke_instance_method(&self.method("prototype.remove"), &ctor, &Params::new())
            .await?;
        model.set_id(None);
        Ok(())
    }

    fn serialize_model(&self, model: &T) -> Result<Params> {
        match serde_json::to_value(model)? {
            Value::Object(map) => Ok(map),
            _ => Err(RemotingError::InvalidArgument(format!(
                "{} models must serialize to a JSON object",
                self.class_name
            ))),
        }
    }
}
