use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use revdiff_types::FieldTypeDefinition;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Settings;
use crate::traits::{BaseFieldSchema, ConfigProvider, FieldTypeRegistry};

/// Immutable configuration snapshot backing all three lookups.
///
/// Built once (in code or from TOML) and shared by reference for the
/// duration of a comparison. Nothing mutates it after construction.
///
/// ```toml
/// [settings.text]
/// compare = true
/// show_header = true
///
/// [settings."entity.node.title"]
/// enabled = true
///
/// [field_types.text]
/// label = "Text"
///
/// [field_types.language]
/// label = "Language"
/// has_ui_surface = false
///
/// [base_fields]
/// node = ["title", "status"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    settings: BTreeMap<String, Settings>,
    #[serde(default)]
    field_types: BTreeMap<String, FieldTypeDefinition>,
    #[serde(default)]
    base_fields: BTreeMap<String, BTreeSet<String>>,
}

impl ConfigSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a TOML document.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let mut snapshot: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for (key, settings) in snapshot.settings.iter_mut() {
            settings.set_key(key.clone());
        }
        Ok(snapshot)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Builder: register settings under `key`.
    pub fn with_settings(mut self, key: impl Into<String>, mut settings: Settings) -> Self {
        let key = key.into();
        settings.set_key(key.clone());
        self.settings.insert(key, settings);
        self
    }

    /// Builder: register a field type.
    pub fn with_field_type(
        mut self,
        type_name: impl Into<String>,
        definition: FieldTypeDefinition,
    ) -> Self {
        self.field_types.insert(type_name.into(), definition);
        self
    }

    /// Builder: declare base fields for an entity type.
    pub fn with_base_fields<I, S>(mut self, entity_type: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_fields
            .entry(entity_type.into())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }
}

impl ConfigProvider for ConfigSnapshot {
    fn get(&self, key: &str) -> Option<Settings> {
        self.settings.get(key).cloned()
    }
}

impl FieldTypeRegistry for ConfigSnapshot {
    fn definition(&self, type_name: &str) -> Option<FieldTypeDefinition> {
        self.field_types.get(type_name).cloned()
    }

    fn type_names(&self) -> Vec<String> {
        self.field_types.keys().cloned().collect()
    }
}

impl BaseFieldSchema for ConfigSnapshot {
    fn base_field_names(&self, entity_type: &str) -> BTreeSet<String> {
        self.base_fields.get(entity_type).cloned().unwrap_or_default()
    }

    fn is_base_field(&self, entity_type: &str, field_name: &str) -> bool {
        self.base_fields
            .get(entity_type)
            .is_some_and(|names| names.contains(field_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MarkdownMode;
    use std::io::Write;

    const SAMPLE: &str = r#"
[settings.text_long]
compare = true
show_header = false
markdown = "filter_xss_all"

[settings."entity.node.title"]
enabled = 1

[field_types.text_long]
label = "Text (formatted, long)"

[field_types.language]
label = "Language"
has_ui_surface = false

[base_fields]
node = ["title", "status"]
"#;

    #[test]
    fn parses_all_sections() {
        let snapshot = ConfigSnapshot::from_toml_str(SAMPLE).unwrap();

        let body = snapshot.get("text_long").unwrap();
        assert_eq!(body.key(), "text_long");
        assert!(!body.show_header().unwrap());
        assert_eq!(body.markdown().unwrap(), MarkdownMode::FilterXssStrict);

        let title = snapshot.get("entity.node.title").unwrap();
        assert_eq!(title.key(), "entity.node.title");
        assert!(title.enabled().unwrap());

        assert!(!snapshot.definition("language").unwrap().has_ui_surface);
        assert!(snapshot.definition("text_long").unwrap().has_ui_surface);
        assert_eq!(snapshot.type_names(), vec!["language", "text_long"]);

        assert!(snapshot.is_base_field("node", "title"));
        assert!(!snapshot.is_base_field("node", "body"));
        assert!(snapshot.base_field_names("user").is_empty());
    }

    #[test]
    fn missing_key_is_none() {
        let snapshot = ConfigSnapshot::from_toml_str(SAMPLE).unwrap();
        assert!(snapshot.get("image").is_none());
        assert!(snapshot.definition("image").is_none());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = ConfigSnapshot::from_toml_str("[settings\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builder_matches_parsed() {
        let built = ConfigSnapshot::new()
            .with_settings("entity.node.title", Settings::new("").with("enabled", 1))
            .with_base_fields("node", ["title", "status"]);
        assert_eq!(built.get("entity.node.title").unwrap().key(), "entity.node.title");
        assert!(built.is_base_field("node", "status"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let snapshot = ConfigSnapshot::load(file.path()).unwrap();
        assert!(snapshot.get("text_long").is_some());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigSnapshot::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
