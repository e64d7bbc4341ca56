//! `/recipe/tags` and `/recipe/ingredients`: list (optionally `assigned_only`)
//! and create, always for the authenticated user.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use service::attributes::{Attribute, AttributeRepository, AttributeService};
use service::auth::domain::AuthUser;
use service::filters::parse_flag;

use super::REQUIRED;
use crate::auth::ServerState;
use crate::errors::{ApiError, AppJson};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttributeQuery {
    /// Truthy (`1`, `true`, ...) to return only entries linked to a recipe.
    pub assigned_only: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttributeRequest {
    pub name: Option<String>,
}

async fn list<R: AttributeRepository>(
    svc: &AttributeService<R>,
    user: &AuthUser,
    query: &AttributeQuery,
) -> Result<AppJson<Vec<Attribute>>, ApiError> {
    let assigned_only = parse_flag("assigned_only", query.assigned_only.as_deref())?;
    Ok(AppJson(svc.list(user.id, assigned_only).await?))
}

async fn create<R: AttributeRepository>(
    svc: &AttributeService<R>,
    user: &AuthUser,
    req: AttributeRequest,
) -> Result<(StatusCode, AppJson<Attribute>), ApiError> {
    let name = req.name.ok_or_else(|| ApiError::field("name", REQUIRED))?;
    Ok((StatusCode::CREATED, AppJson(svc.create(user.id, &name).await?)))
}

#[utoipa::path(get, path = "/recipe/tags", params(AttributeQuery),
    responses((status = 200, description = "Tags of the current user"), (status = 400, description = "Bad filter")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn list_tags(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AttributeQuery>,
) -> Result<AppJson<Vec<Attribute>>, ApiError> {
    list(&state.tags, &user, &query).await
}

#[utoipa::path(post, path = "/recipe/tags", request_body = AttributeRequest,
    responses((status = 201, description = "Tag created"), (status = 400, description = "Validation error")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn create_tag(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<AttributeRequest>,
) -> Result<(StatusCode, AppJson<Attribute>), ApiError> {
    create(&state.tags, &user, req).await
}

#[utoipa::path(get, path = "/recipe/ingredients", params(AttributeQuery),
    responses((status = 200, description = "Ingredients of the current user"), (status = 400, description = "Bad filter")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn list_ingredients(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AttributeQuery>,
) -> Result<AppJson<Vec<Attribute>>, ApiError> {
    list(&state.ingredients, &user, &query).await
}

#[utoipa::path(post, path = "/recipe/ingredients", request_body = AttributeRequest,
    responses((status = 201, description = "Ingredient created"), (status = 400, description = "Validation error")),
    security(("bearer" = [])), tag = "recipe")]
pub async fn create_ingredient(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<AttributeRequest>,
) -> Result<(StatusCode, AppJson<Attribute>), ApiError> {
    create(&state.ingredients, &user, req).await
}
