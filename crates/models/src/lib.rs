//! SeaORM entities for the recipe API plus the model-level validation that
//! every write path shares.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod tag;
pub mod ingredient;
pub mod recipe;
pub mod recipe_tag;
pub mod recipe_ingredient;

#[cfg(test)]
mod tests;
