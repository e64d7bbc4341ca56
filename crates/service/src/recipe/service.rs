use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::recipe as recipe_model;

use super::domain::{RecipeChanges, RecipeDetail, RecipeFilter, RecipeImage, RecipeInput, RecipeSummary};
use super::repository::RecipeRepository;
use crate::errors::{FieldErrorsBuilder, ServiceError};
use crate::storage::ImageStore;

/// Upload folder under `uploads/` for recipe images.
const IMAGE_FOLDER: &str = "recipe";

/// Application service encapsulating recipe business rules.
pub struct RecipeService<R: RecipeRepository, S: ImageStore> {
    repo: Arc<R>,
    images: Arc<S>,
}

fn validate(changes: &RecipeChanges) -> Result<(), ServiceError> {
    let mut errors = FieldErrorsBuilder::new();
    if let Some(title) = &changes.title {
        errors.check(recipe_model::validate_title(title))?;
    }
    if let Some(minutes) = changes.time_minutes {
        errors.check(recipe_model::validate_time_minutes(minutes))?;
    }
    if let Some(price) = changes.price {
        errors.check(recipe_model::validate_price(price))?;
    }
    errors.finish()
}

fn normalize_ids(ids: &mut Vec<i32>) {
    ids.sort_unstable();
    ids.dedup();
}

impl<R: RecipeRepository, S: ImageStore> RecipeService<R, S> {
    pub fn new(repo: Arc<R>, images: Arc<S>) -> Self { Self { repo, images } }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid, filter: RecipeFilter) -> Result<Vec<RecipeSummary>, ServiceError> {
        self.repo.list(user_id, &filter).await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, user_id: Uuid, mut input: RecipeInput) -> Result<RecipeSummary, ServiceError> {
        validate(&RecipeChanges::from(input.clone()))?;
        normalize_ids(&mut input.tags);
        normalize_ids(&mut input.ingredients);
        let created = self.repo.create(user_id, &input).await?;
        info!(user_id = %user_id, recipe_id = created.id, "recipe_created");
        Ok(created)
    }

    pub async fn get(&self, user_id: Uuid, id: i32) -> Result<RecipeDetail, ServiceError> {
        let record = self.repo.get(user_id, id).await?.ok_or_else(|| ServiceError::not_found("recipe"))?;
        Ok(RecipeDetail {
            id: record.recipe.id,
            title: record.recipe.title,
            time_minutes: record.recipe.time_minutes,
            price: recipe_model::display_price(record.recipe.price),
            tags: record.tags,
            ingredients: record.ingredients,
            image: record.recipe.image.as_deref().map(|p| self.images.url_for(p)),
        })
    }

    /// Full replacement (PUT): omitted link lists clear the links.
    pub async fn replace(&self, user_id: Uuid, id: i32, input: RecipeInput) -> Result<RecipeSummary, ServiceError> {
        self.update(user_id, id, input.into()).await
    }

    /// Partial update (PATCH).
    #[instrument(skip(self, changes))]
    pub async fn update(&self, user_id: Uuid, id: i32, mut changes: RecipeChanges) -> Result<RecipeSummary, ServiceError> {
        validate(&changes)?;
        if let Some(tags) = changes.tags.as_mut() {
            normalize_ids(tags);
        }
        if let Some(ingredients) = changes.ingredients.as_mut() {
            normalize_ids(ingredients);
        }
        let updated = self
            .repo
            .update(user_id, id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("recipe"))?;
        info!(user_id = %user_id, recipe_id = id, "recipe_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: i32) -> Result<(), ServiceError> {
        let deleted = self.repo.delete(user_id, id).await?.ok_or_else(|| ServiceError::not_found("recipe"))?;
        if let Some(path) = deleted.image.as_deref() {
            if let Err(e) = self.images.remove(path).await {
                warn!(recipe_id = id, %path, err = %e, "failed to remove recipe image");
            }
        }
        info!(user_id = %user_id, recipe_id = id, "recipe_deleted");
        Ok(())
    }

    /// 404 unless the recipe exists and belongs to `user_id`.
    pub async fn ensure_owned(&self, user_id: Uuid, id: i32) -> Result<(), ServiceError> {
        self.repo.find(user_id, id).await?.map(|_| ()).ok_or_else(|| ServiceError::not_found("recipe"))
    }

    /// Store a new image for the recipe, replacing (and removing) any previous one.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(&self, user_id: Uuid, id: i32, bytes: &[u8]) -> Result<RecipeImage, ServiceError> {
        let found = self.repo.find(user_id, id).await?.ok_or_else(|| ServiceError::not_found("recipe"))?;
        let previous = found.image.clone();
        let path = self.images.save(IMAGE_FOLDER, bytes).await?;
        let updated = match self.repo.set_image(found, path.clone()).await {
            Ok(updated) => updated,
            Err(e) => {
                let _ = self.images.remove(&path).await;
                return Err(e);
            }
        };
        if let Some(old) = previous.as_deref() {
            if let Err(e) = self.images.remove(old).await {
                warn!(recipe_id = id, path = %old, err = %e, "failed to remove replaced image");
            }
        }
        info!(user_id = %user_id, recipe_id = id, %path, "recipe_image_uploaded");
        Ok(RecipeImage { id: updated.id, image: self.images.url_for(&path) })
    }
}
