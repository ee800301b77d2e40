//! Remote method invocation pipeline.
//!
//! Maps logical method names (`"widget.findById"`,
//! `"widget.prototype.save"`) to HTTP requests via a [`Contract`], and
//! normalizes responses and failures into [`RemotingResponse`] /
//! [`crate::RemotingError`].

mod adapter;
mod contract;
mod object;
mod params;
mod repository;
mod response;

pub use adapter::{RemoteAdapter, RestAdapter, StreamParam};
pub use contract::{Contract, ContractItem, ParameterEncoding};
pub use object::RemoteObject;
pub use params::{flatten_parameters, flatten_to_strings, merge_params, params_from, Params};
pub use repository::RemoteRepository;
pub use response::RemotingResponse;
