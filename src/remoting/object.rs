//! Virtual remote object.

use crate::error::Result;
use crate::remoting::params::Params;
use crate::remoting::repository::RemoteRepository;
use crate::remoting::response::RemotingResponse;

/// A local stand-in for one server-side object instance.
///
/// The creation parameters (typically the natural key) were supplied when
/// the object was created through its repository; every method invocation
/// merges them under the call parameters, with the call parameters winning
/// on collision.
#[derive(Clone)]
pub struct RemoteObject {
    repository: RemoteRepository,
    creation_parameters: Params,
}

impl RemoteObject {
    pub(crate) fn new(repository: RemoteRepository, creation_parameters: Params) -> Self {
        Self {
            repository,
            creation_parameters,
        }
    }

    pub fn creation_parameters(&self) -> &Params {
        &self.creation_parameters
    }

    pub fn repository(&self) -> &RemoteRepository {
        &self.repository
    }

    /// Invokes the instance method `"<Class>.prototype.<method>"`.
    pub async fn invoke_method(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let full_name = format!("{}.prototype.{}", self.repository.class_name(), method);
        self.repository
            .adapter()
            .invoke_instance_method(&full_name, &self.creation_parameters, parameters)
            .await
    }
}
