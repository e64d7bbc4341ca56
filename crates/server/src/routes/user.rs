use axum::{extract::State, http::StatusCode, Extension};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use service::auth::domain::{AuthUser, LoginInput, ProfileUpdate, RegisterInput};
use service::errors::{FieldErrorsBuilder, NON_FIELD_ERRORS};

use super::REQUIRED;
use crate::auth::ServerState;
use crate::errors::{ApiError, AppJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Only the supplied fields change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<AuthUser> for UserResponse {
    fn from(u: AuthUser) -> Self { Self { email: u.email, name: u.name } }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[utoipa::path(post, path = "/user/create", request_body = RegisterRequest,
    responses((status = 201, description = "User created", body = UserResponse), (status = 400, description = "Validation error")),
    tag = "user")]
pub async fn create_user(
    State(state): State<ServerState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, AppJson<UserResponse>), ApiError> {
    let mut errors = FieldErrorsBuilder::new();
    if req.email.is_none() {
        errors.push("email", REQUIRED);
    }
    if req.password.is_none() {
        errors.push("password", REQUIRED);
    }
    errors.finish()?;

    let input = RegisterInput {
        email: req.email.unwrap_or_default(),
        name: req.name.unwrap_or_default(),
        password: req.password.unwrap_or_default(),
    };
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, AppJson(user.into())))
}

#[utoipa::path(post, path = "/user/token", request_body = TokenRequest,
    responses((status = 200, description = "Token issued", body = TokenResponse), (status = 400, description = "Invalid credentials")),
    tag = "user")]
pub async fn create_token(
    State(state): State<ServerState>,
    AppJson(req): AppJson<TokenRequest>,
) -> Result<AppJson<TokenResponse>, ApiError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::field(NON_FIELD_ERRORS, "Must include \"email\" and \"password\"."));
    };
    let session = state.auth.login(LoginInput { email, password }).await?;
    Ok(AppJson(TokenResponse { token: session.token }))
}

#[utoipa::path(get, path = "/user/me",
    responses((status = 200, description = "Current user", body = UserResponse), (status = 401, description = "Unauthenticated")),
    security(("bearer" = [])), tag = "user")]
pub async fn me(Extension(user): Extension<AuthUser>) -> AppJson<UserResponse> {
    AppJson(user.into())
}

#[utoipa::path(patch, path = "/user/me", request_body = ProfileRequest,
    responses((status = 200, description = "Updated user", body = UserResponse), (status = 400, description = "Validation error")),
    security(("bearer" = [])), tag = "user")]
pub async fn update_me(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    AppJson(req): AppJson<ProfileRequest>,
) -> Result<AppJson<UserResponse>, ApiError> {
    let updated = state
        .auth
        .update_profile(user.id, ProfileUpdate { name: req.name, password: req.password })
        .await?;
    Ok(AppJson(updated.into()))
}
