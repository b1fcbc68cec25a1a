use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

pub const COMPARE: &str = "compare";
pub const SHOW_HEADER: &str = "show_header";
pub const MARKDOWN: &str = "markdown";
pub const ENABLED: &str = "enabled";

// ---------------------------------------------------------------------------
// MarkdownMode
// ---------------------------------------------------------------------------

/// Text transform applied to a field's text before the `raw_plain` state
/// is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownMode {
    /// Identity; no `raw_plain` state is produced.
    #[default]
    None,
    /// Strip markup down to visible text.
    #[serde(alias = "strip_html_to_text", alias = "drupal_html_to_text")]
    HtmlToText,
    /// Sanitize against the default tag allow-list.
    FilterXss,
    /// Sanitize against an empty allow-list, removing every tag.
    #[serde(alias = "filter_xss_all")]
    FilterXssStrict,
}

impl MarkdownMode {
    /// Canonical transform name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HtmlToText => "html_to_text",
            Self::FilterXss => "filter_xss",
            Self::FilterXssStrict => "filter_xss_strict",
        }
    }

    /// Returns `true` for the identity transform.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl FromStr for MarkdownMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "" | "none" => Ok(Self::None),
            "html_to_text" | "strip_html_to_text" | "drupal_html_to_text" => Ok(Self::HtmlToText),
            "filter_xss" => Ok(Self::FilterXss),
            "filter_xss_strict" | "filter_xss_all" => Ok(Self::FilterXssStrict),
            other => Err(ConfigError::UnknownTransform(other.to_string())),
        }
    }
}

impl fmt::Display for MarkdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// A mapping from option name to value, resolved for one configuration key.
///
/// Values are kept loosely typed, the way they are stored, and interpreted
/// by the typed accessors at the point of use. A value that cannot be
/// interpreted is a [`ConfigError::MalformedSetting`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The configuration key these settings were resolved from.
    #[serde(skip)]
    key: String,
    #[serde(flatten)]
    options: BTreeMap<String, Value>,
}

impl Settings {
    /// Empty settings for the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: BTreeMap::new(),
        }
    }

    /// Builder: set an option.
    pub fn with(mut self, option: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(option.into(), value.into());
        self
    }

    /// The key these settings were resolved from.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Raw option lookup.
    pub fn get(&self, option: &str) -> Option<&Value> {
        self.options.get(option)
    }

    /// Returns `true` if no options are set.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Whether the field type participates in comparison. Defaults to `true`.
    pub fn compare(&self) -> ConfigResult<bool> {
        self.flag(COMPARE, true)
    }

    /// Whether the field's label is surfaced in the result. Defaults to `true`.
    pub fn show_header(&self) -> ConfigResult<bool> {
        self.flag(SHOW_HEADER, true)
    }

    /// Whether a per-field override opts the field in. Defaults to `false`.
    pub fn enabled(&self) -> ConfigResult<bool> {
        self.flag(ENABLED, false)
    }

    /// The configured text transform. Defaults to [`MarkdownMode::None`].
    pub fn markdown(&self) -> ConfigResult<MarkdownMode> {
        match self.options.get(MARKDOWN) {
            None | Some(Value::Null) => Ok(MarkdownMode::None),
            Some(Value::String(name)) => name.parse(),
            Some(other) => Err(self.malformed(MARKDOWN, format!("expected a string, got {other}"))),
        }
    }

    /// Interpret a bool-ish option: booleans, `0`/`1`, and their string forms.
    fn flag(&self, option: &str, default: bool) -> ConfigResult<bool> {
        let Some(value) = self.options.get(option) else {
            return Ok(default);
        };
        match value {
            Value::Null => Ok(default),
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.malformed(option, format!("expected 0 or 1, got {n}"))),
            },
            Value::String(s) => match s.trim() {
                "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => Err(self.malformed(option, format!("expected a boolean, got {other:?}"))),
            },
            other => Err(self.malformed(option, format!("expected a boolean, got {other}"))),
        }
    }

    fn malformed(&self, option: &str, reason: String) -> ConfigError {
        ConfigError::MalformedSetting {
            key: self.key.clone(),
            option: option.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_empty() {
        let s = Settings::new("text");
        assert!(s.compare().unwrap());
        assert!(s.show_header().unwrap());
        assert!(!s.enabled().unwrap());
        assert_eq!(s.markdown().unwrap(), MarkdownMode::None);
    }

    #[test]
    fn boolish_values() {
        let s = Settings::new("text")
            .with(COMPARE, json!(0))
            .with(SHOW_HEADER, json!("1"))
            .with(ENABLED, json!("true"));
        assert!(!s.compare().unwrap());
        assert!(s.show_header().unwrap());
        assert!(s.enabled().unwrap());
    }

    #[test]
    fn malformed_flag_names_key_and_option() {
        let s = Settings::new("entity.node.title").with(ENABLED, json!("maybe"));
        match s.enabled().unwrap_err() {
            ConfigError::MalformedSetting { key, option, .. } => {
                assert_eq!(key, "entity.node.title");
                assert_eq!(option, ENABLED);
            }
            other => panic!("expected MalformedSetting, got {other:?}"),
        }
    }

    #[test]
    fn markdown_accepts_both_naming_families() {
        for (name, mode) in [
            ("none", MarkdownMode::None),
            ("html_to_text", MarkdownMode::HtmlToText),
            ("strip_html_to_text", MarkdownMode::HtmlToText),
            ("drupal_html_to_text", MarkdownMode::HtmlToText),
            ("filter_xss", MarkdownMode::FilterXss),
            ("filter_xss_strict", MarkdownMode::FilterXssStrict),
            ("filter_xss_all", MarkdownMode::FilterXssStrict),
        ] {
            let s = Settings::new("text_long").with(MARKDOWN, name);
            assert_eq!(s.markdown().unwrap(), mode, "{name}");
        }
    }

    #[test]
    fn unknown_markdown_is_configuration_error() {
        let s = Settings::new("text_long").with(MARKDOWN, "rot13");
        assert!(matches!(
            s.markdown().unwrap_err(),
            ConfigError::UnknownTransform(name) if name == "rot13"
        ));
    }

    #[test]
    fn non_string_markdown_is_malformed() {
        let s = Settings::new("text_long").with(MARKDOWN, json!(3));
        assert!(matches!(
            s.markdown().unwrap_err(),
            ConfigError::MalformedSetting { .. }
        ));
    }

    #[test]
    fn deserializes_from_flat_map() {
        let s: Settings =
            serde_json::from_value(json!({"compare": true, "markdown": "filter_xss"})).unwrap();
        assert!(s.compare().unwrap());
        assert_eq!(s.markdown().unwrap(), MarkdownMode::FilterXss);
        assert_eq!(s.key(), "");
    }

    #[test]
    fn mode_display_is_canonical() {
        assert_eq!(MarkdownMode::FilterXssStrict.to_string(), "filter_xss_strict");
        assert!(MarkdownMode::None.is_none());
    }
}
