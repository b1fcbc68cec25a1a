//! Configuration collaborators for the revdiff comparison engine.
//!
//! The engine never reads ambient configuration. Everything it needs is
//! passed in through three read-only lookups:
//!
//! - [`ConfigProvider`] — settings keyed by `"<field_type>"` or
//!   `"entity.<entity_type>.<field_name>"`
//! - [`FieldTypeRegistry`] — field-type metadata (label, UI surface)
//! - [`BaseFieldSchema`] — schema-fixed field names per entity type
//!
//! [`ConfigSnapshot`] implements all three and can be loaded from TOML.

pub mod error;
pub mod settings;
pub mod snapshot;
pub mod traits;

pub use error::{ConfigError, ConfigResult};
pub use settings::{MarkdownMode, Settings};
pub use snapshot::ConfigSnapshot;
pub use traits::{BaseFieldSchema, ConfigProvider, FieldTypeRegistry, override_key};
