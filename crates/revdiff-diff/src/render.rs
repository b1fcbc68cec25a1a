//! Field rendering: turning a field's structured values into lines.
//!
//! Each field type tag maps to a [`FieldRenderer`] in a [`RendererRegistry`].
//! The registry is built once at startup and only read afterwards.

use std::collections::HashMap;

use revdiff_config::{settings::COMPARE, Settings};
use revdiff_types::Field;
use serde_json::Value;
use tracing::debug;

use crate::error::DiffResult;

/// The lines one field value renders to, before multi-value joining.
pub type LineGroup = Vec<String>;

/// Per-field data handed to a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonContext {
    /// The field's type tag.
    pub field_type: String,
    /// Settings relevant to rendering; carries the type-level `compare` flag.
    pub compare_settings: Settings,
}

impl ComparisonContext {
    /// Build a context for a field type with its type-level compare flag.
    pub fn new(field_type: impl Into<String>, compare: bool) -> Self {
        let field_type = field_type.into();
        let compare_settings = Settings::new(field_type.clone()).with(COMPARE, compare);
        Self {
            field_type,
            compare_settings,
        }
    }
}

/// Renders a field's values to line-groups.
///
/// Returning an empty vector excludes the field from comparison.
pub trait FieldRenderer: Send + Sync {
    fn build(&self, field: &Field, context: &ComparisonContext) -> Vec<LineGroup>;
}

// ---------------------------------------------------------------------------
// Built-in renderers
// ---------------------------------------------------------------------------

/// Renders scalar values as text, one line-group per value.
///
/// Strings are taken as-is, numbers and booleans via their display form.
/// Objects carrying a `value` property (formatted text) render that
/// property; other objects render as compact JSON. Nulls, empty strings
/// and empty arrays render nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn render_value(value: &Value) -> Option<String> {
        let text = match value {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(Self::render_value).collect();
                parts.join("\n")
            }
            Value::Object(map) => match map.get("value") {
                Some(inner) => return Self::render_value(inner),
                None => value.to_string(),
            },
        };
        (!text.is_empty()).then_some(text)
    }
}

impl FieldRenderer for TextRenderer {
    fn build(&self, field: &Field, _context: &ComparisonContext) -> Vec<LineGroup> {
        field
            .values
            .iter()
            .filter_map(Self::render_value)
            .map(|text| text.split('\n').map(str::to_string).collect())
            .collect()
    }
}

/// Renders object values as `property: value` lines for a fixed list of
/// properties (e.g. `target_id`, `alt`, `title` for images).
#[derive(Clone, Debug)]
pub struct ReferenceRenderer {
    properties: Vec<String>,
}

impl ReferenceRenderer {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl FieldRenderer for ReferenceRenderer {
    fn build(&self, field: &Field, _context: &ComparisonContext) -> Vec<LineGroup> {
        let mut groups = Vec::with_capacity(field.values.len());
        for value in &field.values {
            let group: LineGroup = match value {
                Value::Object(map) => self
                    .properties
                    .iter()
                    .filter_map(|prop| {
                        let rendered = TextRenderer::render_value(map.get(prop)?)?;
                        Some(format!("{prop}: {rendered}"))
                    })
                    .collect(),
                other => TextRenderer::render_value(other).into_iter().collect(),
            };
            if !group.is_empty() {
                groups.push(group);
            }
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// RendererRegistry
// ---------------------------------------------------------------------------

/// Maps field type tags to renderers, with an optional fallback.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn FieldRenderer>>,
    fallback: Option<Box<dyn FieldRenderer>>,
}

impl RendererRegistry {
    /// An empty registry without a fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text rendering for every type, with property renderers for image and
    /// entity reference fields.
    pub fn standard() -> Self {
        let mut registry = Self::new().with_fallback(Box::new(TextRenderer));
        registry.register(
            "image",
            Box::new(ReferenceRenderer::new(["target_id", "alt", "title"])),
        );
        registry.register("entity_reference", Box::new(ReferenceRenderer::new(["target_id"])));
        registry
    }

    /// Register the renderer for a type tag, replacing any previous one.
    pub fn register(&mut self, field_type: impl Into<String>, renderer: Box<dyn FieldRenderer>) {
        self.renderers.insert(field_type.into(), renderer);
    }

    /// Builder: set the renderer used for unregistered type tags.
    pub fn with_fallback(mut self, renderer: Box<dyn FieldRenderer>) -> Self {
        self.fallback = Some(renderer);
        self
    }

    /// Whether a dedicated renderer exists for the type tag.
    pub fn contains(&self, field_type: &str) -> bool {
        self.renderers.contains_key(field_type)
    }

    /// Render a field, honouring the context's `compare` flag.
    ///
    /// Returns no line-groups when comparison is switched off for the type
    /// or when no renderer handles it.
    pub fn build(&self, field: &Field, context: &ComparisonContext) -> DiffResult<Vec<LineGroup>> {
        if !context.compare_settings.compare()? {
            debug!(field = %field.name, field_type = %context.field_type, "comparison disabled for type");
            return Ok(Vec::new());
        }
        let renderer = match self.renderers.get(&context.field_type) {
            Some(renderer) => renderer.as_ref(),
            None => match &self.fallback {
                Some(fallback) => fallback.as_ref(),
                None => {
                    debug!(field = %field.name, field_type = %context.field_type, "no renderer for type");
                    return Ok(Vec::new());
                }
            },
        };
        Ok(renderer.build(field, context))
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.renderers.keys().collect();
        types.sort();
        f.debug_struct("RendererRegistry")
            .field("types", &types)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
