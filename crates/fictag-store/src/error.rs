use fictag_core::{CoreError, FieldErrors};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("migration error: {0}")]
    Migration(String),
    /// The actor may not perform this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// User-correctable input problems keyed by field.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// Stored data breaks an invariant (e.g. a two-hop alias chain).
    #[error("consistency error: {0}")]
    Consistency(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Json,
    Core,
    MissingHomeDir,
    InvalidDataPath,
    NotFound,
    Migration,
    PermissionDenied,
    Validation,
    Consistency,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Json(_) => StoreErrorKind::Json,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::PermissionDenied(_) => StoreErrorKind::PermissionDenied,
            StoreError::Validation(_) => StoreErrorKind::Validation,
            StoreError::Consistency(_) => StoreErrorKind::Consistency,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            StoreError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub(crate) fn invalid(field: &str, message: impl Into<String>) -> StoreError {
    StoreError::Validation(FieldErrors::single(field, message))
}
