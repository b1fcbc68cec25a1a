//! Foundation types for revdiff.
//!
//! This crate provides the record model compared by the diff engine. Every
//! other revdiff crate depends on `revdiff-types`.
//!
//! # Key Types
//!
//! - [`Record`] — One revision of a structured entity, holding ordered fields
//! - [`Field`] — A named, typed, possibly multi-valued attribute of a record
//! - [`FieldTypeDefinition`] — Registry metadata for a field type tag

pub mod error;
pub mod field_type;
pub mod record;

pub use error::{TypeError, TypeResult};
pub use field_type::FieldTypeDefinition;
pub use record::{Field, Record};
