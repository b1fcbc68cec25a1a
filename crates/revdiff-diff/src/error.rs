//! Error types for the diff crate.

use revdiff_config::ConfigError;

/// Errors that can occur while comparing two revisions.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A field's declared type has no registered definition. The record
    /// schema and the field-type registry disagree.
    #[error("field '{field}' has unregistered type '{field_type}'")]
    SchemaInconsistency { field: String, field_type: String },

    /// An unknown transform or a malformed settings value.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A record lacks a capability the comparison requires.
    #[error("entity type '{entity_type}' is not {capability}")]
    EntityCapability {
        entity_type: String,
        capability: String,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
