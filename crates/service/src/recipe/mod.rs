//! Recipes: owner-scoped CRUD with tag/ingredient links, id-list filtering
//! and image upload.

pub mod domain;
pub mod repository;
pub mod service;

pub use repository::{RecipeRepository, SeaOrmRecipeRepository};
pub use service::RecipeService;
