use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};

/// A named, typed attribute of a record.
///
/// Fields hold an ordered list of values so multi-value fields (tags,
/// image galleries) keep their slot order. A single-value field is simply a
/// list of length one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Machine name, unique within its record.
    pub name: String,
    /// Field type tag, resolved against the field-type registry.
    pub field_type: String,
    /// Human-readable label. Falls back to the machine name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered values.
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Field {
    /// Create an empty field of the given type.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            values: Vec::new(),
        }
    }

    /// Builder: set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder: append a value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Builder: append several values in order.
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// The label to display, falling back to the machine name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if the field holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One revision of a structured content entity.
///
/// Field order is the record's natural iteration order and is preserved
/// through the whole comparison. Field names never repeat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr", into = "RecordRepr")]
pub struct Record {
    entity_type: String,
    revision: Option<u64>,
    revisionable: bool,
    fields: Vec<Field>,
    /// Field name → position in `fields`.
    index: HashMap<String, usize>,
}

impl Record {
    /// Create an empty, revisionable record of the given entity type.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            revision: None,
            revisionable: true,
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builder: set the revision identifier.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Builder: mark whether the entity type keeps revisions.
    pub fn with_revisionable(mut self, revisionable: bool) -> Self {
        self.revisionable = revisionable;
        self
    }

    /// Builder: append a field, rejecting duplicate or empty names.
    pub fn with_field(mut self, field: Field) -> TypeResult<Self> {
        self.push_field(field)?;
        Ok(self)
    }

    /// Append a field, rejecting duplicate or empty names.
    pub fn push_field(&mut self, field: Field) -> TypeResult<()> {
        if field.name.is_empty() {
            return Err(TypeError::EmptyFieldName);
        }
        if self.index.contains_key(&field.name) {
            return Err(TypeError::DuplicateField { name: field.name });
        }
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// The entity type id, e.g. `"node"`.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The revision identifier, if known.
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Whether the entity type keeps revisions.
    pub fn is_revisionable(&self) -> bool {
        self.revisionable
    }

    /// Fields in natural iteration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by machine name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&at| &self.fields[at])
    }

    /// Parse a record from its JSON form.
    pub fn from_json(json: &str) -> TypeResult<Self> {
        serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// Wire form of a [`Record`]; validated on the way in.
#[derive(Serialize, Deserialize)]
struct RecordRepr {
    entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revision: Option<u64>,
    #[serde(default = "default_revisionable")]
    revisionable: bool,
    #[serde(default)]
    fields: Vec<Field>,
}

fn default_revisionable() -> bool {
    true
}

impl TryFrom<RecordRepr> for Record {
    type Error = TypeError;

    fn try_from(repr: RecordRepr) -> TypeResult<Self> {
        let mut record = Self::new(repr.entity_type).with_revisionable(repr.revisionable);
        record.revision = repr.revision;
        for field in repr.fields {
            record.push_field(field)?;
        }
        Ok(record)
    }
}

impl From<Record> for RecordRepr {
    fn from(record: Record) -> Self {
        Self {
            entity_type: record.entity_type,
            revision: record.revision,
            revisionable: record.revisionable,
            fields: record.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order() {
        let record = Record::new("node")
            .with_field(Field::new("title", "string").with_value("Hello"))
            .unwrap()
            .with_field(Field::new("body", "text_long").with_value("<p>Hi</p>"))
            .unwrap();

        let names: Vec<_> = record.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "body"]);
        assert!(record.is_revisionable());
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = Record::new("node")
            .with_field(Field::new("title", "string"))
            .unwrap()
            .with_field(Field::new("title", "string"))
            .unwrap_err();
        assert_eq!(
            err,
            TypeError::DuplicateField {
                name: "title".into()
            }
        );
    }

    #[test]
    fn empty_field_name_rejected() {
        let err = Record::new("node")
            .with_field(Field::new("", "string"))
            .unwrap_err();
        assert_eq!(err, TypeError::EmptyFieldName);
    }

    #[test]
    fn json_roundtrip_preserves_fields() {
        let json = r#"{
            "entity_type": "node",
            "revision": 7,
            "fields": [
                {"name": "title", "field_type": "string", "values": ["Old"]},
                {"name": "tags", "field_type": "entity_reference", "label": "Tags", "values": ["a", "b"]}
            ]
        }"#;
        let record = Record::from_json(json).unwrap();
        assert_eq!(record.entity_type(), "node");
        assert_eq!(record.revision(), Some(7));
        assert!(record.is_revisionable());
        assert_eq!(record.field("tags").unwrap().display_label(), "Tags");
        assert_eq!(record.field("title").unwrap().display_label(), "title");

        let back = serde_json::to_string(&record).unwrap();
        assert_eq!(Record::from_json(&back).unwrap(), record);
    }

    #[test]
    fn json_with_duplicate_fields_rejected() {
        let json = r#"{
            "entity_type": "node",
            "fields": [
                {"name": "title", "field_type": "string"},
                {"name": "title", "field_type": "string"}
            ]
        }"#;
        let err = Record::from_json(json).unwrap_err();
        assert!(matches!(err, TypeError::Serialization(msg) if msg.contains("title")));
    }
}
