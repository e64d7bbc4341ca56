//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, token issuance, bearer-token authentication and profile
//! updates live here, independent of the HTTP layer.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
