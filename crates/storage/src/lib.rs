//! Competition and vote registry: data model, validation rules, and the
//! in-memory and PostgreSQL backends.

pub mod database;
pub mod dto;
pub mod error;
pub mod events;
pub mod models;
pub mod registry;
pub mod services;

pub use database::Database;
pub use error::{ErrorKind, RegistryError, Result};
pub use events::{EventBus, RegistryEvent};
pub use registry::{MemoryRegistry, PgRegistry, Registry};
