use std::collections::BTreeMap;

use models::errors::ModelError;
use sea_orm::DbErr;
use thiserror::Error;

/// Field name to messages, serialized as-is in 400 responses.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key for errors that are not tied to one input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// A single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation { field, message } => ServiceError::field(&field, message),
            ModelError::Duplicate(_) => ServiceError::field(NON_FIELD_ERRORS, "A record with these values already exists."),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

/// Accumulates per-field failures so a request reports every bad field at once.
#[derive(Debug, Default)]
pub struct FieldErrorsBuilder {
    errors: FieldErrors,
}

impl FieldErrorsBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record a model validation failure; other errors are returned unchanged.
    pub fn check(&mut self, result: Result<(), ModelError>) -> Result<(), ServiceError> {
        match result {
            Ok(()) => Ok(()),
            Err(ModelError::Validation { field, message }) => {
                self.push(&field, message);
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn finish(self) -> Result<(), ServiceError> {
        if self.errors.is_empty() { Ok(()) } else { Err(ServiceError::Validation(self.errors)) }
    }
}
