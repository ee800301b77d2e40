//! REST Transport Adapter
//!
//! The single chokepoint every remote call passes through. Given a logical
//! method name and a parameter map, the adapter resolves the route from its
//! [`Contract`], merges and substitutes parameters, encodes the body, sends
//! the request over `reqwest`, and normalizes the outcome into a
//! [`RemotingResponse`] or a [`RemotingError`].
//!
//! Contract resolution, flattening, and path substitution are pure and
//! synchronous; the only suspension point is the send/receive round trip.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::multipart;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{RemotingError, Result};
use crate::remoting::contract::{Contract, ContractItem, ParameterEncoding};
use crate::remoting::params::{flatten_to_strings, merge_params, Params};
use crate::remoting::response::RemotingResponse;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_MAX_IDLE_PER_HOST: usize = 16;

/// One file part of a multipart upload: field name, file name, content
/// type, and the (fully buffered) bytes.
#[derive(Debug, Clone)]
pub struct StreamParam {
    name: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl StreamParam {
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// The invocation surface consumers program against.
///
/// [`RestAdapter`] is the in-crate implementation; the trait is the seam
/// for substituting a recording or fake transport in tests.
#[async_trait]
pub trait RemoteAdapter: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Invokes a class-level method (`"Widget.findById"`).
    async fn invoke_static_method(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse>;

    /// Invokes an instance method (`"Widget.prototype.save"`); the
    /// constructor parameters identify the server-side instance and are
    /// merged under the call parameters, which win on collision.
    async fn invoke_instance_method(
        &self,
        method: &str,
        constructor_parameters: &Params,
        parameters: &Params,
    ) -> Result<RemotingResponse>;
}

/// Adapter for RESTful servers, holding the connection state, the default
/// headers, and the [`Contract`] that maps methods to routes.
///
/// The contract and header maps are shared across invocations and written
/// at setup time; per-call state is stack-local, so concurrent calls on one
/// shared adapter do not interfere.
pub struct RestAdapter {
    base_url: RwLock<Option<String>>,
    client: RwLock<Option<reqwest::Client>>,
    headers: RwLock<HashMap<String, String>>,
    contract: RwLock<Contract>,
    timeout: RwLock<Duration>,
}

impl Default for RestAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RestAdapter {
    /// Creates a disconnected adapter with the default Accept and
    /// User-Agent headers.
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert(
            "User-Agent".to_string(),
            format!("remoting-client/{}", env!("CARGO_PKG_VERSION")),
        );

        Self {
            base_url: RwLock::new(None),
            client: RwLock::new(None),
            headers: RwLock::new(headers),
            contract: RwLock::new(Contract::new()),
            timeout: RwLock::new(DEFAULT_TIMEOUT),
        }
    }

    /// Creates an adapter already connected to `url`.
    pub fn with_url(url: &str) -> Result<Arc<Self>> {
        let adapter = Arc::new(Self::new());
        adapter.connect(url)?;
        Ok(adapter)
    }

    /// Connects to `url`, building the HTTP transport handle. An empty url
    /// disconnects instead. Trailing slashes are trimmed.
    pub fn connect(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            self.disconnect();
            return Ok(());
        }

        let client = reqwest::Client::builder()
            .timeout(*self.timeout.read())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()?;

        let base = url.trim_end_matches('/').to_string();
        info!("Connected remoting adapter to {}", base);
        *self.base_url.write() = Some(base);
        *self.client.write() = Some(client);
        Ok(())
    }

    pub fn disconnect(&self) {
        if self.client.write().take().is_some() {
            info!("Disconnected remoting adapter");
        }
        *self.base_url.write() = None;
    }

    /// True iff a transport handle exists, i.e. `connect` was called with a
    /// non-empty url.
    pub fn is_connected(&self) -> bool {
        self.client.read().is_some()
    }

    pub fn base_url(&self) -> Option<String> {
        self.base_url.read().clone()
    }

    /// Request timeout for connections established after this call.
    pub fn set_timeout(&self, timeout: Duration) {
        *self.timeout.write() = timeout;
    }

    // ------------------------------------------------------------------
    // Default headers
    // ------------------------------------------------------------------

    /// Sets a default header attached to every subsequent request.
    pub fn set_header(&self, name: &str, value: &str) {
        self.headers
            .write()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_header(&self, name: &str) {
        self.headers.write().remove(name);
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.read().get(name).cloned()
    }

    /// Installs `token` as the raw `Authorization` header value.
    pub fn set_access_token(&self, token: &str) {
        self.set_header("Authorization", token);
    }

    pub fn access_token(&self) -> Option<String> {
        self.header("Authorization")
    }

    /// Removes the `Authorization` header entirely, so subsequent requests
    /// carry no credential.
    pub fn clear_access_token(&self) {
        self.remove_header("Authorization");
    }

    // ------------------------------------------------------------------
    // Contract
    // ------------------------------------------------------------------

    /// Registers a single route in the adapter's shared contract.
    pub fn add_item(&self, item: ContractItem, method_name: &str) -> Result<()> {
        self.contract.write().add_item(item, method_name)
    }

    /// Merges a collaborator's contract into the adapter's shared one;
    /// `other` wins on name collision.
    pub fn add_items_from_contract(&self, other: &Contract) {
        self.contract.write().add_items_from_contract(other);
    }

    /// Snapshot of the current contract.
    pub fn contract(&self) -> Contract {
        self.contract.read().clone()
    }

    // ------------------------------------------------------------------
    // Invocation
    // ------------------------------------------------------------------

    pub async fn invoke_static_method(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let response = self.request(method, parameters.clone(), None).await?;
        Self::text_result(response).await
    }

    /// The static shape with the response body captured as bytes plus its
    /// declared content type. Used for downloads.
    pub async fn invoke_static_method_binary(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let response = self.request(method, parameters.clone(), None).await?;
        Self::binary_result(response).await
    }

    /// The upload shape: scalar parameters become flattened text parts and
    /// each [`StreamParam`] becomes a file part. The contract item for
    /// `method` should use [`ParameterEncoding::Multipart`].
    pub async fn invoke_static_method_multipart(
        &self,
        method: &str,
        parameters: &Params,
        streams: Vec<StreamParam>,
    ) -> Result<RemotingResponse> {
        let response = self
            .request(method, parameters.clone(), Some(streams))
            .await?;
        Self::text_result(response).await
    }

    pub async fn invoke_instance_method(
        &self,
        method: &str,
        constructor_parameters: &Params,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let combined = merge_params(constructor_parameters, parameters);
        let response = self.request(method, combined, None).await?;
        Self::text_result(response).await
    }

    pub async fn invoke_instance_method_binary(
        &self,
        method: &str,
        constructor_parameters: &Params,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        let combined = merge_params(constructor_parameters, parameters);
        let response = self.request(method, combined, None).await?;
        Self::binary_result(response).await
    }

    /// Builds and sends one request. All contract resolution happens before
    /// the single await; lock guards never cross it.
    async fn request(
        &self,
        method: &str,
        mut parameters: Params,
        streams: Option<Vec<StreamParam>>,
    ) -> Result<reqwest::Response> {
        let (client, base_url) = {
            let client = self.client.read();
            let base_url = self.base_url.read();
            match (client.as_ref(), base_url.as_ref()) {
                (Some(client), Some(base_url)) => (client.clone(), base_url.clone()),
                _ => return Err(RemotingError::NotConnected),
            }
        };

        let (verb, encoding, path) = {
            let contract = self.contract.read();
            let verb = contract.verb_for_method(method)?.to_string();
            let encoding = contract.parameter_encoding_for_method(method)?;
            let (path, consumed) = contract.resolve_url(method, &parameters)?;
            for key in &consumed {
                parameters.remove(key);
            }
            (verb, encoding, path)
        };

        let http_method = reqwest::Method::from_bytes(verb.as_bytes())
            .map_err(|_| RemotingError::InvalidArgument(format!("invalid HTTP verb '{}'", verb)))?;

        let mut url = if path.starts_with('/') {
            format!("{}{}", base_url, path)
        } else {
            format!("{}/{}", base_url, path)
        };

        // GET/HEAD/DELETE carry their parameters in the query string and
        // send no body, whatever the registered encoding says.
        let skip_body = matches!(verb.as_str(), "GET" | "HEAD" | "DELETE");
        if skip_body && !parameters.is_empty() {
            let query = serde_urlencoded::to_string(flatten_to_strings(&parameters))?;
            url.push('?');
            url.push_str(&query);
        }

        let mut request = client.request(http_method, &url);
        for (name, value) in self.headers.read().iter() {
            request = request.header(name.as_str(), value.as_str());
        }

        if !skip_body {
            request = match encoding {
                ParameterEncoding::FormUrl => {
                    // Nested maps are flattened before form encoding, same
                    // bracket keys as the query-string path.
                    request.form(&flatten_to_strings(&parameters))
                }
                ParameterEncoding::Json => {
                    if parameters.is_empty() {
                        request
                    } else {
                        request.json(&Value::Object(parameters))
                    }
                }
                ParameterEncoding::Multipart => {
                    let mut form = multipart::Form::new();
                    for (key, value) in flatten_to_strings(&parameters) {
                        form = form.text(key, value);
                    }
                    for stream in streams.unwrap_or_default() {
                        let part = multipart::Part::bytes(stream.bytes)
                            .file_name(stream.file_name)
                            .mime_str(&stream.content_type)?;
                        form = form.part(stream.name, part);
                    }
                    request.multipart(form)
                }
            };
        }

        debug!("{} {} ({})", verb, url, method);
        let response = request.send().await.map_err(|e| {
            error!("{} {} failed: {}", verb, url, e);
            RemotingError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} {} returned {}", verb, url, status);
            return Err(RemotingError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn text_result(response: reqwest::Response) -> Result<RemotingResponse> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok(RemotingResponse::from_text(status, text))
    }

    async fn binary_result(response: reqwest::Response) -> Result<RemotingResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(RemotingResponse::from_binary(status, bytes, content_type))
    }
}

#[async_trait]
impl RemoteAdapter for RestAdapter {
    fn is_connected(&self) -> bool {
        RestAdapter::is_connected(self)
    }

    async fn invoke_static_method(
        &self,
        method: &str,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        RestAdapter::invoke_static_method(self, method, parameters).await
    }

    async fn invoke_instance_method(
        &self,
        method: &str,
        constructor_parameters: &Params,
        parameters: &Params,
    ) -> Result<RemotingResponse> {
        RestAdapter::invoke_instance_method(self, method, constructor_parameters, parameters).await
    }
}
