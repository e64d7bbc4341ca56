//! Service layer for the recipe API.
//! - Separates business rules from data access (repository traits + SeaORM impls).
//! - Reuses validation and entity definitions from the `models` crate.
//! - Stays independent of the web framework; `server` maps results to HTTP.

pub mod errors;
pub mod auth;
pub mod attributes;
pub mod recipe;
pub mod filters;
pub mod storage;
#[cfg(test)]
pub mod test_support;
