//! HTTP surface of the competition registry.

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
