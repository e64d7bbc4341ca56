//! Tags and ingredients: user-owned name records that recipes link to.
//! Both share one domain type, repository trait and service.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::Attribute;
pub use repository::{AttributeRepository, SeaOrmIngredientRepository, SeaOrmTagRepository};
pub use service::AttributeService;
