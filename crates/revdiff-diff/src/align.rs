//! Field alignment: merging two rendered records into comparison units.
//!
//! Units are emitted for the union of field names: first every field of the
//! left side in its order, then the fields present only on the right side.

use std::collections::HashSet;

use revdiff_config::{ConfigProvider, Settings};
use revdiff_types::{Field, Record};
use serde::Serialize;

use crate::error::{DiffError, DiffResult};
use crate::normalize::RenderedFields;
use crate::render::LineGroup;

/// One field, ready for diffing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonUnit {
    /// Field machine name.
    pub name: String,
    /// Field label, present only when `show_header` is enabled.
    pub label: Option<String>,
    /// Type-level settings of the field.
    pub settings: Settings,
    /// Newline-joined left values; empty when the field is right-only.
    pub left_text: String,
    /// Newline-joined right values; empty when the field is left-only.
    pub right_text: String,
}

/// Join two value sequences positionally into left/right texts.
///
/// The i-th left value pairs with the i-th right value by index only.
/// Each value's line-group is joined with `\n` first, then the values are.
pub fn combine(left: &[LineGroup], right: &[LineGroup]) -> (String, String) {
    let n = left.len().max(right.len());
    let mut left_acc = Vec::with_capacity(left.len());
    let mut right_acc = Vec::with_capacity(right.len());

    for delta in 0..n {
        if let Some(group) = left.get(delta) {
            left_acc.push(group.join("\n"));
        }
        if let Some(group) = right.get(delta) {
            right_acc.push(group.join("\n"));
        }
    }

    (left_acc.join("\n"), right_acc.join("\n"))
}

/// Merges left and right renderings by field name.
pub struct FieldAligner<'a> {
    config: &'a dyn ConfigProvider,
}

impl<'a> FieldAligner<'a> {
    pub fn new(config: &'a dyn ConfigProvider) -> Self {
        Self { config }
    }

    /// Build one unit per field name in either rendering.
    ///
    /// When a field exists on both sides the left definition decides the
    /// unit's settings and label.
    pub fn merge(
        &self,
        left_rendered: &RenderedFields,
        right_rendered: &RenderedFields,
        left_record: &Record,
        right_record: &Record,
    ) -> DiffResult<Vec<ComparisonUnit>> {
        let mut units = Vec::with_capacity(left_rendered.len() + right_rendered.len());
        let mut consumed: HashSet<&str> = HashSet::new();

        for (name, left_values) in left_rendered.iter() {
            let field = definition(left_record, name)?;
            let right_values = match right_rendered.get(name) {
                Some(values) => {
                    consumed.insert(name);
                    values
                }
                None => &[],
            };
            units.push(self.unit(field, left_values, right_values)?);
        }

        for (name, right_values) in right_rendered.iter() {
            if consumed.contains(name) {
                continue;
            }
            let field = definition(right_record, name)?;
            units.push(self.unit(field, &[], right_values)?);
        }

        Ok(units)
    }

    fn unit(
        &self,
        field: &Field,
        left_values: &[LineGroup],
        right_values: &[LineGroup],
    ) -> DiffResult<ComparisonUnit> {
        let settings = self
            .config
            .get(&field.field_type)
            .unwrap_or_else(|| Settings::new(field.field_type.clone()));
        let label = if settings.show_header()? {
            Some(field.display_label().to_string())
        } else {
            None
        };
        let (left_text, right_text) = combine(left_values, right_values);

        Ok(ComparisonUnit {
            name: field.name.clone(),
            label,
            settings,
            left_text,
            right_text,
        })
    }
}

/// The record's definition of a rendered field.
fn definition<'r>(record: &'r Record, name: &str) -> DiffResult<&'r Field> {
    record.field(name).ok_or_else(|| DiffError::SchemaInconsistency {
        field: name.to_string(),
        field_type: "<absent from record>".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use revdiff_config::ConfigSnapshot;

    fn groups(values: &[&str]) -> Vec<LineGroup> {
        values.iter().map(|v| vec![v.to_string()]).collect()
    }

    fn rendered(entries: Vec<(&str, Vec<&str>)>) -> RenderedFields {
        let mut out = RenderedFields::new();
        for (name, values) in entries {
            out.insert(name, groups(&values));
        }
        out
    }

    fn record(names: &[&str]) -> Record {
        let mut record = Record::new("node");
        for name in names {
            record
                .push_field(Field::new(*name, "string").with_label(name.to_uppercase()))
                .unwrap();
        }
        record
    }

    #[test]
    fn combine_pairs_positionally() {
        let (l, r) = combine(&groups(&["a", "b", "c"]), &groups(&["x", "y"]));
        assert_eq!(l, "a\nb\nc");
        assert_eq!(r, "x\ny");
    }

    #[test]
    fn combine_flattens_multi_line_groups() {
        let left = vec![vec!["target_id: 1".to_string(), "alt: Cat".to_string()]];
        let (l, r) = combine(&left, &[]);
        assert_eq!(l, "target_id: 1\nalt: Cat");
        assert_eq!(r, "");
    }

    #[test]
    fn combine_empty_side_mirrors() {
        let (l1, r1) = combine(&[], &groups(&["x"]));
        let (l2, r2) = combine(&groups(&["x"]), &[]);
        assert_eq!((l1.as_str(), r1.as_str()), ("", "x"));
        assert_eq!((l2.as_str(), r2.as_str()), ("x", ""));
    }

    #[test]
    fn combine_identical_sequences_equal() {
        let v = groups(&["a", "b"]);
        let (l, r) = combine(&v, &v);
        assert_eq!(l, r);
    }

    #[test]
    fn merge_is_union_left_order_then_right_only() {
        let config = ConfigSnapshot::new();
        let left = rendered(vec![("title", vec!["Old"]), ("subtitle", vec!["Draft"])]);
        let right = rendered(vec![("tags", vec!["a"]), ("title", vec!["New"])]);
        let units = FieldAligner::new(&config)
            .merge(
                &left,
                &right,
                &record(&["title", "subtitle"]),
                &record(&["tags", "title"]),
            )
            .unwrap();

        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["title", "subtitle", "tags"]);

        assert_eq!(units[0].left_text, "Old");
        assert_eq!(units[0].right_text, "New");
        assert_eq!(units[1].right_text, "");
        assert_eq!(units[2].left_text, "");
        assert_eq!(units[2].right_text, "a");
    }

    #[test]
    fn label_follows_show_header() {
        let config = ConfigSnapshot::new()
            .with_settings("string", Settings::new("").with("show_header", false));
        let left = rendered(vec![("title", vec!["Old"])]);
        let units = FieldAligner::new(&config)
            .merge(&left, &RenderedFields::new(), &record(&["title"]), &record(&[]))
            .unwrap();
        assert_eq!(units[0].label, None);

        let config = ConfigSnapshot::new();
        let units = FieldAligner::new(&config)
            .merge(&left, &RenderedFields::new(), &record(&["title"]), &record(&[]))
            .unwrap();
        assert_eq!(units[0].label.as_deref(), Some("TITLE"));
    }

    #[test]
    fn left_definition_wins_on_both_sides() {
        let config = ConfigSnapshot::new();
        let left_record = Record::new("node")
            .with_field(Field::new("title", "string").with_label("Left title"))
            .unwrap();
        let right_record = Record::new("node")
            .with_field(Field::new("title", "string").with_label("Right title"))
            .unwrap();
        let units = FieldAligner::new(&config)
            .merge(
                &rendered(vec![("title", vec!["Old"])]),
                &rendered(vec![("title", vec!["New"])]),
                &left_record,
                &right_record,
            )
            .unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].label.as_deref(), Some("Left title"));
    }

    #[test]
    fn settings_resolved_by_type_with_key() {
        let config = ConfigSnapshot::new()
            .with_settings("string", Settings::new("").with("markdown", "filter_xss"));
        let units = FieldAligner::new(&config)
            .merge(
                &rendered(vec![("title", vec!["Old"])]),
                &RenderedFields::new(),
                &record(&["title"]),
                &record(&[]),
            )
            .unwrap();
        assert_eq!(units[0].settings.key(), "string");
        assert!(units[0].settings.get("markdown").is_some());
    }

    #[test]
    fn rendered_name_missing_from_record_is_error() {
        let config = ConfigSnapshot::new();
        let err = FieldAligner::new(&config)
            .merge(
                &rendered(vec![("ghost", vec!["x"])]),
                &RenderedFields::new(),
                &record(&[]),
                &record(&[]),
            )
            .unwrap_err();
        assert!(matches!(err, DiffError::SchemaInconsistency { field, .. } if field == "ghost"));
    }

    #[test]
    fn merge_handles_wide_records() {
        let left_names: Vec<String> = (0..2_000).map(|i| format!("field_{i}")).collect();
        let right_names: Vec<String> = (1_000..3_000).map(|i| format!("field_{i}")).collect();
        let left_refs: Vec<&str> = left_names.iter().map(String::as_str).collect();
        let right_refs: Vec<&str> = right_names.iter().map(String::as_str).collect();

        let left = rendered(left_refs.iter().map(|n| (*n, vec!["l"])).collect());
        let right = rendered(right_refs.iter().map(|n| (*n, vec!["r"])).collect());
        let units = FieldAligner::new(&ConfigSnapshot::new())
            .merge(&left, &right, &record(&left_refs), &record(&right_refs))
            .unwrap();

        assert_eq!(units.len(), 3_000);
        assert_eq!(units[0].name, "field_0");
        assert_eq!(units[1_500].left_text, "l");
        assert_eq!(units[1_500].right_text, "r");
        assert_eq!(units[2_000].name, "field_2000");
        assert_eq!(units[2_000].left_text, "");
    }
}
