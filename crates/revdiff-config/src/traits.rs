use std::collections::BTreeSet;

use revdiff_types::FieldTypeDefinition;

use crate::settings::Settings;

/// Read-only settings lookup.
///
/// Keys are dotted strings: `"<field_type>"` for type-level settings, or
/// `"entity.<entity_type>.<field_name>"` for per-field overrides. Returns
/// `None` when nothing is configured under the key.
pub trait ConfigProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<Settings>;
}

/// Field-type metadata lookup.
pub trait FieldTypeRegistry: Send + Sync {
    /// Definition of a single field type, or `None` if it is not registered.
    fn definition(&self, type_name: &str) -> Option<FieldTypeDefinition>;

    /// All registered type names.
    fn type_names(&self) -> Vec<String>;
}

/// Schema-fixed ("base") field names per entity type.
pub trait BaseFieldSchema: Send + Sync {
    fn base_field_names(&self, entity_type: &str) -> BTreeSet<String>;

    /// Whether `field_name` is a base field of `entity_type`.
    fn is_base_field(&self, entity_type: &str, field_name: &str) -> bool {
        self.base_field_names(entity_type).contains(field_name)
    }
}

/// The per-field override key for a field of an entity type.
pub fn override_key(entity_type: &str, field_name: &str) -> String {
    format!("entity.{entity_type}.{field_name}")
}
