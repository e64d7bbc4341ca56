use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::{FieldErrors, ServiceError, NON_FIELD_ERRORS};

/// HTTP-facing error; every variant renders a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated(detail) => (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response(),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::Malformed(detail) => (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response(),
            ApiError::NotFound => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "A server error occurred." }))).into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errors) => ApiError::Validation(errors),
            ServiceError::NotFound(_) => ApiError::NotFound,
            ServiceError::Db(_) | ServiceError::Storage(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation { field, message } => ApiError::field(&field, message),
            AuthError::Conflict => ApiError::field("email", "user with this email already exists."),
            AuthError::Unauthorized => ApiError::field(NON_FIELD_ERRORS, "Unable to authenticate with provided credentials."),
            AuthError::NotFound => ApiError::NotFound,
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                ApiError::Internal(format!("auth error {}: {}", e.code(), e))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

/// `Json` whose rejections render as `ApiError` bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
