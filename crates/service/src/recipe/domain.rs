use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;

/// List/create representation: links as plain ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// Detail representation: nested tag/ingredient objects and the image URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
    pub image: Option<String>,
}

/// A recipe row with its linked records, as loaded by the repository.
#[derive(Debug, Clone)]
pub struct RecipeRecord {
    pub recipe: models::recipe::Model,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
}

/// Full set of writable fields (create and PUT).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub ingredients: Vec<i32>,
}

/// Partial update (PATCH). A supplied link list replaces the existing set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

impl From<RecipeInput> for RecipeChanges {
    fn from(input: RecipeInput) -> Self {
        Self {
            title: Some(input.title),
            time_minutes: Some(input.time_minutes),
            price: Some(input.price),
            tags: Some(input.tags),
            ingredients: Some(input.ingredients),
        }
    }
}

/// Recipe list filter. Empty lists do not filter; within a list any id
/// matches, and both lists must match when both are given.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// Response of a successful image upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeImage {
    pub id: i32,
    pub image: String,
}
