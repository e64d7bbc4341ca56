use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Query, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use models::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};

use super::domain::{RecipeChanges, RecipeFilter, RecipeInput, RecipeRecord, RecipeSummary};
use crate::attributes::Attribute;
use crate::errors::{FieldErrorsBuilder, ServiceError};

/// Persistence for recipes. Every method is scoped to `user_id`; rows owned
/// by someone else behave exactly like missing rows.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn list(&self, user_id: Uuid, filter: &RecipeFilter) -> Result<Vec<RecipeSummary>, ServiceError>;
    async fn find(&self, user_id: Uuid, id: i32) -> Result<Option<recipe::Model>, ServiceError>;
    async fn get(&self, user_id: Uuid, id: i32) -> Result<Option<RecipeRecord>, ServiceError>;
    /// Insert the recipe and its links in one transaction.
    async fn create(&self, user_id: Uuid, input: &RecipeInput) -> Result<RecipeSummary, ServiceError>;
    /// Apply supplied fields and replace supplied link sets in one transaction.
    async fn update(&self, user_id: Uuid, id: i32, changes: &RecipeChanges) -> Result<Option<RecipeSummary>, ServiceError>;
    /// Returns the deleted row.
    async fn delete(&self, user_id: Uuid, id: i32) -> Result<Option<recipe::Model>, ServiceError>;
    async fn set_image(&self, recipe: recipe::Model, path: String) -> Result<recipe::Model, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmRecipeRepository {
    pub db: DatabaseConnection,
}

fn missing_pk(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Every referenced tag/ingredient must exist and belong to `user_id`.
async fn check_links<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    tags: Option<&[i32]>,
    ingredients: Option<&[i32]>,
) -> Result<(), ServiceError> {
    let mut errors = FieldErrorsBuilder::new();
    if let Some(ids) = tags {
        let owned: HashSet<i32> = tag::find_owned(db, user_id, ids).await?.into_iter().map(|t| t.id).collect();
        for id in ids.iter().filter(|id| !owned.contains(*id)) {
            errors.push("tags", missing_pk(*id));
        }
    }
    if let Some(ids) = ingredients {
        let owned: HashSet<i32> = ingredient::find_owned(db, user_id, ids).await?.into_iter().map(|i| i.id).collect();
        for id in ids.iter().filter(|id| !owned.contains(*id)) {
            errors.push("ingredients", missing_pk(*id));
        }
    }
    errors.finish()
}

/// Attach link ids to each row, keeping the row order.
async fn summaries<C: ConnectionTrait>(db: &C, rows: Vec<recipe::Model>) -> Result<Vec<RecipeSummary>, ServiceError> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut tags: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in recipe_tag::for_recipes(db, &ids).await? {
        tags.entry(link.recipe_id).or_default().push(link.tag_id);
    }
    let mut ingredients: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in recipe_ingredient::for_recipes(db, &ids).await? {
        ingredients.entry(link.recipe_id).or_default().push(link.ingredient_id);
    }
    Ok(rows
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            tags: tags.remove(&r.id).unwrap_or_default(),
            ingredients: ingredients.remove(&r.id).unwrap_or_default(),
            title: r.title,
            time_minutes: r.time_minutes,
            price: recipe::display_price(r.price),
        })
        .collect())
}

#[async_trait]
impl RecipeRepository for SeaOrmRecipeRepository {
    async fn list(&self, user_id: Uuid, filter: &RecipeFilter) -> Result<Vec<RecipeSummary>, ServiceError> {
        let mut query = recipe::Entity::find().filter(recipe::Column::UserId.eq(user_id));
        if !filter.tags.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tag::Column::RecipeId)
                        .from(recipe_tag::Entity)
                        .and_where(recipe_tag::Column::TagId.is_in(filter.tags.clone()))
                        .to_owned(),
                ),
            );
        }
        if !filter.ingredients.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredient::Column::RecipeId)
                        .from(recipe_ingredient::Entity)
                        .and_where(recipe_ingredient::Column::IngredientId.is_in(filter.ingredients.clone()))
                        .to_owned(),
                ),
            );
        }
        let rows = query.order_by_desc(recipe::Column::Id).all(&self.db).await?;
        summaries(&self.db, rows).await
    }

    async fn find(&self, user_id: Uuid, id: i32) -> Result<Option<recipe::Model>, ServiceError> {
        Ok(recipe::find_owned(&self.db, user_id, id).await?)
    }

    async fn get(&self, user_id: Uuid, id: i32) -> Result<Option<RecipeRecord>, ServiceError> {
        let Some(row) = recipe::find_owned(&self.db, user_id, id).await? else {
            return Ok(None);
        };
        let tags = row
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Attribute::from)
            .collect();
        let ingredients = row
            .find_related(ingredient::Entity)
            .order_by_asc(ingredient::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Attribute::from)
            .collect();
        Ok(Some(RecipeRecord { recipe: row, tags, ingredients }))
    }

    async fn create(&self, user_id: Uuid, input: &RecipeInput) -> Result<RecipeSummary, ServiceError> {
        let txn = self.db.begin().await?;
        check_links(&txn, user_id, Some(&input.tags), Some(&input.ingredients)).await?;
        let new = recipe::NewRecipe { title: input.title.clone(), time_minutes: input.time_minutes, price: input.price };
        let row = recipe::create(&txn, user_id, &new).await?;
        recipe_tag::replace_for_recipe(&txn, row.id, &input.tags).await?;
        recipe_ingredient::replace_for_recipe(&txn, row.id, &input.ingredients).await?;
        txn.commit().await?;
        Ok(RecipeSummary {
            id: row.id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: recipe::display_price(row.price),
            tags: input.tags.clone(),
            ingredients: input.ingredients.clone(),
        })
    }

    async fn update(&self, user_id: Uuid, id: i32, changes: &RecipeChanges) -> Result<Option<RecipeSummary>, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(found) = recipe::find_owned(&txn, user_id, id).await? else {
            return Ok(None);
        };
        check_links(&txn, user_id, changes.tags.as_deref(), changes.ingredients.as_deref()).await?;

        let mut am: recipe::ActiveModel = found.into();
        if let Some(title) = &changes.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(minutes) = changes.time_minutes {
            am.time_minutes = Set(minutes);
        }
        if let Some(price) = changes.price {
            am.price = Set(recipe::display_price(price));
        }
        am.updated_at = Set(Utc::now().into());
        let row = am.update(&txn).await?;

        if let Some(tags) = &changes.tags {
            recipe_tag::replace_for_recipe(&txn, row.id, tags).await?;
        }
        if let Some(ingredients) = &changes.ingredients {
            recipe_ingredient::replace_for_recipe(&txn, row.id, ingredients).await?;
        }
        let summary = summaries(&txn, vec![row]).await?.into_iter().next();
        txn.commit().await?;
        Ok(summary)
    }

    async fn delete(&self, user_id: Uuid, id: i32) -> Result<Option<recipe::Model>, ServiceError> {
        let Some(found) = recipe::find_owned(&self.db, user_id, id).await? else {
            return Ok(None);
        };
        recipe::Entity::delete_by_id(found.id).exec(&self.db).await?;
        Ok(Some(found))
    }

    async fn set_image(&self, recipe: recipe::Model, path: String) -> Result<recipe::Model, ServiceError> {
        let mut am: recipe::ActiveModel = recipe.into();
        am.image = Set(Some(path));
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?)
    }
}
