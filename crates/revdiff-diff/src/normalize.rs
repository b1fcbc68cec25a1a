//! Field normalization: one record to an ordered field→line-groups map.
//!
//! Decides which fields participate in a comparison and renders them.
//! Participation rules, in order:
//!
//! 1. Types without a configuration surface participate unless the
//!    `entity.<entity_type>.<field_name>` override exists and is disabled.
//! 2. Base fields whose type has no type-level settings participate only
//!    when that override exists and is enabled.
//! 3. Every other field is rendered; the type-level `compare` flag travels
//!    in the [`ComparisonContext`] and is honoured by the renderer registry.
//!
//! Fields that render to nothing are omitted.

use std::collections::HashMap;

use revdiff_config::{
    override_key, BaseFieldSchema, ConfigProvider, FieldTypeRegistry, Settings,
};
use revdiff_types::{Field, FieldTypeDefinition, Record};
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::render::{ComparisonContext, LineGroup, RendererRegistry};

// ---------------------------------------------------------------------------
// RenderedFields
// ---------------------------------------------------------------------------

/// Field name → rendered line-groups, in the record's field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedFields {
    entries: Vec<(String, Vec<LineGroup>)>,
    index: HashMap<String, usize>,
}

impl RenderedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field's rendering. A repeated name replaces the earlier
    /// entry in place so names stay unique.
    pub fn insert(&mut self, name: impl Into<String>, groups: Vec<LineGroup>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&at) => self.entries[at].1 = groups,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, groups));
            }
        }
    }

    /// Line-groups for a field, if it was rendered.
    pub fn get(&self, name: &str) -> Option<&[LineGroup]> {
        let &at = self.index.get(name)?;
        Some(self.entries[at].1.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LineGroup])> {
        self.entries
            .iter()
            .map(|(n, groups)| (n.as_str(), groups.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FieldNormalizer
// ---------------------------------------------------------------------------

/// Renders the participating fields of a record.
pub struct FieldNormalizer<'a> {
    config: &'a dyn ConfigProvider,
    field_types: &'a dyn FieldTypeRegistry,
    base_fields: &'a dyn BaseFieldSchema,
    renderers: &'a RendererRegistry,
}

impl<'a> FieldNormalizer<'a> {
    pub fn new(
        config: &'a dyn ConfigProvider,
        field_types: &'a dyn FieldTypeRegistry,
        base_fields: &'a dyn BaseFieldSchema,
        renderers: &'a RendererRegistry,
    ) -> Self {
        Self {
            config,
            field_types,
            base_fields,
            renderers,
        }
    }

    /// Render every participating field of `record`.
    ///
    /// Fails with [`DiffError::SchemaInconsistency`] when a field's type is
    /// not registered.
    pub fn normalize(&self, record: &Record) -> DiffResult<RenderedFields> {
        let mut rendered = RenderedFields::new();

        for field in record.fields() {
            let definition = self.field_types.definition(&field.field_type).ok_or_else(|| {
                DiffError::SchemaInconsistency {
                    field: field.name.clone(),
                    field_type: field.field_type.clone(),
                }
            })?;
            let type_settings = self.config.get(&field.field_type);

            if !self.participates(record, field, &definition, type_settings.as_ref())? {
                debug!(field = %field.name, "field excluded by participation rules");
                continue;
            }

            let compare = match &type_settings {
                Some(settings) => settings.compare()?,
                None => true,
            };
            let context = ComparisonContext::new(field.field_type.clone(), compare);
            let groups = self.renderers.build(field, &context)?;
            if groups.is_empty() {
                debug!(field = %field.name, "field rendered empty, omitted");
                continue;
            }
            rendered.insert(field.name.clone(), groups);
        }

        Ok(rendered)
    }

    fn participates(
        &self,
        record: &Record,
        field: &Field,
        definition: &FieldTypeDefinition,
        type_settings: Option<&Settings>,
    ) -> DiffResult<bool> {
        let key = override_key(record.entity_type(), &field.name);

        if !definition.has_ui_surface {
            return match self.config.get(&key) {
                Some(settings) => Ok(settings.enabled()?),
                None => Ok(true),
            };
        }

        if type_settings.is_none() && self.base_fields.is_base_field(record.entity_type(), &field.name)
        {
            return match self.config.get(&key) {
                Some(settings) => Ok(settings.enabled()?),
                None => Ok(false),
            };
        }

        Ok(true)
    }
}
