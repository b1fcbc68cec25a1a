use thiserror::Error;

/// Errors produced while building or loading records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate field name on record: {name}")]
    DuplicateField { name: String },

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for type-level results.
pub type TypeResult<T> = Result<T, TypeError>;
