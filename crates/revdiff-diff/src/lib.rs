//! Field-level revision comparison engine.
//!
//! Compares two revisions of a record field by field: each record's fields
//! are rendered to lines, aligned by field name, optionally passed through
//! a text transform, and assembled into [`DiffState`]s that a rendering
//! layer feeds to a [`LineDiffEngine`].
//!
//! # Key Types
//!
//! - [`DiffStateBuilder`] -- Entry point: `compare_revisions(left, right)`
//! - [`FieldNormalizer`] / [`RenderedFields`] -- Record to field→line-groups
//! - [`FieldAligner`] / [`ComparisonUnit`] -- Union of both sides by field name
//! - [`TextTransformPipeline`] -- Markup stripping and sanitizing
//! - [`DiffState`] / [`StateLines`] -- Per-field output, one entry per state
//! - [`LineDiffEngine`] / [`EditScript`] -- Line diff contract (Myers via `similar`)

pub mod align;
pub mod builder;
pub mod error;
pub mod line_diff;
pub mod lines;
pub mod normalize;
pub mod render;
pub mod state;
pub mod transform;

pub use align::{combine, ComparisonUnit, FieldAligner};
pub use builder::{ComparisonSummary, DiffStateBuilder};
pub use error::{DiffError, DiffResult};
pub use line_diff::{DiffLine, EditOp, EditScript, LineDiffEngine, MyersLineDiff};
pub use lines::split_lines;
pub use normalize::{FieldNormalizer, RenderedFields};
pub use render::{
    ComparisonContext, FieldRenderer, LineGroup, ReferenceRenderer, RendererRegistry, TextRenderer,
};
pub use state::{DiffState, StateLines, RAW_PLAIN_STATE, RAW_STATE};
pub use transform::{
    filter_xss, html_to_text, FilterXss, HtmlToText, TextTransform, TextTransformPipeline,
    DEFAULT_ALLOWED_TAGS,
};
