//! Async client SDK for contract-based REST remoting backends.
//!
//! The core is the invocation pipeline in [`remoting`]: a [`Contract`]
//! maps logical method names to routes, parameters are merged, flattened,
//! and substituted into the path, and a [`RestAdapter`] sends the request
//! and normalizes the outcome. [`models`] layers typed repositories on
//! top; [`RemotingClient`] wires the whole stack behind a builder.

pub mod client;
pub mod error;
pub mod models;
pub mod remoting;
pub mod storage;

pub use client::{RemotingClient, RemotingClientBuilder};
pub use error::{RemotingError, Result};
pub use models::{
    AccessToken, Container, ContainerRepository, FileMeta, FileRepository, LoginCredentials,
    Model, ModelBase, ModelRepository, User, UserRepository,
};
pub use remoting::{
    flatten_parameters, flatten_to_strings, merge_params, params_from, Contract, ContractItem,
    ParameterEncoding, Params, RemoteAdapter, RemoteObject, RemoteRepository, RemotingResponse,
    RestAdapter, StreamParam,
};
pub use storage::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY};
