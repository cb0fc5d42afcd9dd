use std::collections::BTreeMap;

use travlr_catalog::TripValidationError;

pub mod repository;
pub mod memory;
pub mod identity;
pub mod session;
pub mod catalog;

pub use catalog::CatalogService;
pub use identity::{AuthService, User};
pub use repository::{TripRepository, UserRepository};
pub use session::{IssuedSession, SessionClaims, SessionKeys, SESSION_COOKIE};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {}", describe_fields(.0))]
    ValidationError(BTreeMap<String, String>),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {message}")]
    Conflict { message: String, field: Option<String> },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.into());
        CoreError::ValidationError(fields)
    }

    pub fn conflict_on(field: &str, message: impl Into<String>) -> Self {
        CoreError::Conflict { message: message.into(), field: Some(field.to_string()) }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        CoreError::InternalError(err.to_string())
    }
}

impl From<TripValidationError> for CoreError {
    fn from(err: TripValidationError) -> Self {
        CoreError::ValidationError(err.fields)
    }
}

fn describe_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type CoreResult<T> = Result<T, CoreError>;
