//! Typed model layer over the remoting pipeline.
//!
//! Repositories install their routes into the adapter's shared contract at
//! construction and expose typed CRUD over the untyped invocation surface.
//! Model mapping is plain serde; there is no runtime reflection.

mod container;
mod file;
mod model;
mod user;

pub use container::{Container, ContainerRepository};
pub use file::{FileMeta, FileRepository};
pub use model::{Model, ModelBase, ModelRepository};
pub use user::{AccessToken, LoginCredentials, User, UserRepository};
