use serde::{Deserialize, Serialize};

/// Registry metadata for a field type tag such as `"text"` or `"image"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeDefinition {
    /// Human-readable name of the type.
    pub label: String,
    /// Whether the type is configurable through the field settings surface.
    ///
    /// Types without one (`no_ui`) are compared unless a per-field override
    /// turns them off.
    #[serde(default = "default_has_ui_surface")]
    pub has_ui_surface: bool,
}

fn default_has_ui_surface() -> bool {
    true
}

impl FieldTypeDefinition {
    /// A type with a configuration surface.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_ui_surface: true,
        }
    }

    /// A type flagged as having no configuration surface.
    pub fn without_ui(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_ui_surface: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_surface_defaults_on_when_omitted() {
        let def: FieldTypeDefinition = serde_json::from_str(r#"{"label":"Text"}"#).unwrap();
        assert!(def.has_ui_surface);
        assert_eq!(def, FieldTypeDefinition::new("Text"));
    }

    #[test]
    fn without_ui_constructor() {
        let def = FieldTypeDefinition::without_ui("Language");
        assert!(!def.has_ui_surface);
        assert_eq!(def.label, "Language");
    }
}
