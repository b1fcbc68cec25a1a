//! Orchestration: two records in, an ordered list of [`DiffState`]s out.
//!
//! normalize both records -> align into comparison units -> seed the `raw`
//! state -> add `raw_plain` when a transform is configured.

use std::collections::BTreeMap;

use revdiff_config::{BaseFieldSchema, ConfigProvider, ConfigSnapshot, FieldTypeRegistry};
use revdiff_types::Record;
use tracing::{debug, info};

use crate::align::{ComparisonUnit, FieldAligner};
use crate::error::{DiffError, DiffResult};
use crate::normalize::FieldNormalizer;
use crate::render::RendererRegistry;
use crate::state::{DiffState, StateLines, RAW_PLAIN_STATE, RAW_STATE};
use crate::transform::TextTransformPipeline;

/// Counters over one comparison result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    /// Number of fields in the result.
    pub fields_compared: usize,
    /// Number of fields whose raw texts differ.
    pub fields_changed: usize,
}

/// Compares two revisions of a record.
///
/// Configuration lookups are borrowed for the builder's lifetime and only
/// read. Renderers and transforms are resolved once at construction.
pub struct DiffStateBuilder<'a> {
    config: &'a dyn ConfigProvider,
    field_types: &'a dyn FieldTypeRegistry,
    base_fields: &'a dyn BaseFieldSchema,
    renderers: RendererRegistry,
    transforms: TextTransformPipeline,
}

impl<'a> DiffStateBuilder<'a> {
    /// Create a builder with the standard renderers and transforms.
    pub fn new(
        config: &'a dyn ConfigProvider,
        field_types: &'a dyn FieldTypeRegistry,
        base_fields: &'a dyn BaseFieldSchema,
    ) -> Self {
        Self {
            config,
            field_types,
            base_fields,
            renderers: RendererRegistry::standard(),
            transforms: TextTransformPipeline::with_default_transforms(),
        }
    }

    /// Create a builder reading everything from one snapshot.
    pub fn from_snapshot(snapshot: &'a ConfigSnapshot) -> Self {
        Self::new(snapshot, snapshot, snapshot)
    }

    /// Builder: replace the renderer registry.
    pub fn with_renderers(mut self, renderers: RendererRegistry) -> Self {
        self.renderers = renderers;
        self
    }

    /// Builder: replace the transform pipeline.
    pub fn with_transforms(mut self, transforms: TextTransformPipeline) -> Self {
        self.transforms = transforms;
        self
    }

    /// Compare two revisions field by field.
    ///
    /// Both records must be revisionable; this is checked before any field
    /// is processed. Results follow the aligner's order: left fields first,
    /// then right-only fields.
    pub fn compare_revisions(&self, left: &Record, right: &Record) -> DiffResult<Vec<DiffState>> {
        for record in [left, right] {
            if !record.is_revisionable() {
                return Err(DiffError::EntityCapability {
                    entity_type: record.entity_type().to_string(),
                    capability: "revisionable".to_string(),
                });
            }
        }

        let normalizer =
            FieldNormalizer::new(self.config, self.field_types, self.base_fields, &self.renderers);
        let left_rendered = normalizer.normalize(left)?;
        let right_rendered = normalizer.normalize(right)?;
        debug!(
            left_fields = left_rendered.len(),
            right_fields = right_rendered.len(),
            "records normalized"
        );

        let units = FieldAligner::new(self.config).merge(&left_rendered, &right_rendered, left, right)?;

        let states = units
            .into_iter()
            .map(|unit| self.build_state(unit))
            .collect::<DiffResult<Vec<_>>>()?;

        let summary = Self::summarize(&states);
        info!(
            entity_type = left.entity_type(),
            left_revision = ?left.revision(),
            right_revision = ?right.revision(),
            fields = summary.fields_compared,
            changed = summary.fields_changed,
            "revisions compared"
        );
        Ok(states)
    }

    /// Count compared and changed fields.
    pub fn summarize(states: &[DiffState]) -> ComparisonSummary {
        ComparisonSummary {
            fields_compared: states.len(),
            fields_changed: states.iter().filter(|s| s.has_changes()).count(),
        }
    }

    fn build_state(&self, unit: ComparisonUnit) -> DiffResult<DiffState> {
        let mut states = BTreeMap::new();
        states.insert(
            RAW_STATE.to_string(),
            StateLines::new(&unit.left_text, &unit.right_text),
        );

        let mode = unit.settings.markdown()?;
        if !mode.is_none() {
            let left = self.transforms.apply(mode, &unit.left_text)?;
            let right = self.transforms.apply(mode, &unit.right_text)?;
            debug!(field = %unit.name, transform = %mode, "transform applied");
            states.insert(RAW_PLAIN_STATE.to_string(), StateLines::new(&left, &right));
        }

        Ok(DiffState {
            name: unit.name,
            label: unit.label,
            settings: unit.settings,
            states,
        })
    }
}

impl std::fmt::Debug for DiffStateBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffStateBuilder")
            .field("renderers", &self.renderers)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}
