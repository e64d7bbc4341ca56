use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Extension,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use service::auth::domain::AuthUser;
use service::errors::FieldErrorsBuilder;
use service::filters::parse_id_list;
use service::recipe::domain::{RecipeChanges, RecipeDetail, RecipeFilter, RecipeImage, RecipeInput, RecipeSummary};

use super::{parse_id, REQUIRED};
use crate::auth::ServerState;
use crate::errors::{ApiError, AppJson};

const NO_FILE: &str = "No file was submitted.";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeQuery {
    /// Comma-separated tag ids; matches recipes with any of them.
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; matches recipes with any of them.
    pub ingredients: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    /// Decimal with up to two places, as a JSON number or string (`"5.50"`).
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

impl RecipeRequest {
    /// All scalar fields required; link lists default to empty.
    fn into_input(self) -> Result<RecipeInput, ApiError> {
        let mut errors = FieldErrorsBuilder::new();
        if self.title.is_none() {
            errors.push("title", REQUIRED);
        }
        if self.time_minutes.is_none() {
            errors.push("time_minutes", REQUIRED);
        }
        if self.price.is_none() {
            errors.push("price", REQUIRED);
        }
        errors.finish()?;
        Ok(RecipeInput {
            title: self.title.unwrap_or_default(),
            time_minutes: self.time_minutes.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
        })
    }

    fn into_changes(self) -> RecipeChanges {
        RecipeChanges {
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            tags: self.tags,
            ingredients: self.ingredients,
        }
    }
}

#[utoipa::path(get, path = "/recipe/recipes", params(RecipeQuery),
    responses((status = 200, description = "Recipes of the current user, newest first"), (status = 400, description = "Bad filter")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecipeQuery>,
) -> Result<AppJson<Vec<RecipeSummary>>, ApiError> {
    let filter = RecipeFilter {
        tags: parse_id_list("tags", query.tags.as_deref())?,
        ingredients: parse_id_list("ingredients", query.ingredients.as_deref())?,
    };
    Ok(AppJson(state.recipes.list(user.id, filter).await?))
}

#[utoipa::path(post, path = "/recipe/recipes", request_body = RecipeRequest,
    responses((status = 201, description = "Recipe created"), (status = 400, description = "Validation error")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<RecipeRequest>,
) -> Result<(StatusCode, AppJson<RecipeSummary>), ApiError> {
    let created = state.recipes.create(user.id, req.into_input()?).await?;
    Ok((StatusCode::CREATED, AppJson(created)))
}

#[utoipa::path(get, path = "/recipe/recipes/{id}", params(("id" = i32, Path, description = "Recipe id")),
    responses((status = 200, description = "Recipe detail"), (status = 404, description = "Not found")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn retrieve(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<AppJson<RecipeDetail>, ApiError> {
    Ok(AppJson(state.recipes.get(user.id, parse_id(&id)?).await?))
}

#[utoipa::path(put, path = "/recipe/recipes/{id}", params(("id" = i32, Path, description = "Recipe id")), request_body = RecipeRequest,
    responses((status = 200, description = "Recipe replaced"), (status = 400, description = "Validation error"), (status = 404, description = "Not found")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn replace(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RecipeRequest>,
) -> Result<AppJson<RecipeSummary>, ApiError> {
    let id = parse_id(&id)?;
    let input = req.into_input()?;
    Ok(AppJson(state.recipes.replace(user.id, id, input).await?))
}

#[utoipa::path(patch, path = "/recipe/recipes/{id}", params(("id" = i32, Path, description = "Recipe id")), request_body = RecipeRequest,
    responses((status = 200, description = "Recipe updated"), (status = 400, description = "Validation error"), (status = 404, description = "Not found")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn partial_update(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RecipeRequest>,
) -> Result<AppJson<RecipeSummary>, ApiError> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.recipes.update(user.id, id, req.into_changes()).await?))
}

#[utoipa::path(delete, path = "/recipe/recipes/{id}", params(("id" = i32, Path, description = "Recipe id")),
    responses((status = 204, description = "Recipe deleted"), (status = 404, description = "Not found")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn destroy(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.recipes.delete(user.id, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart upload with a single file field named `image`.
#[utoipa::path(post, path = "/recipe/recipes/{id}/upload-image", params(("id" = i32, Path, description = "Recipe id")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "File field `image`"),
    responses((status = 200, description = "Image stored"), (status = 400, description = "Missing or invalid image"), (status = 404, description = "Not found")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn upload_image(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AppJson<RecipeImage>, ApiError> {
    let id = parse_id(&id)?;
    state.recipes.ensure_owned(user.id, id).await?;

    let mut multipart = multipart.map_err(|_| ApiError::field("image", NO_FILE))?;
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::field("image", e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        if field.file_name().is_none() {
            return Err(ApiError::field("image", NOT_A_FILE));
        }
        image = Some(field.bytes().await.map_err(|e| ApiError::field("image", e.body_text()))?);
        break;
    }
    let bytes = image.ok_or_else(|| ApiError::field("image", NO_FILE))?;
    Ok(AppJson(state.recipes.upload_image(user.id, id, &bytes).await?))
}
