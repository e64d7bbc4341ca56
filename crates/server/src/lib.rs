//! HTTP layer of the recipe API: axum router, bearer-token middleware,
//! handlers mapping JSON/multipart requests onto the service crate.

pub mod auth;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::{build_app, run, run_with_config};
