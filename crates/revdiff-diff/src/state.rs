//! Per-field comparison output.

use std::collections::BTreeMap;

use revdiff_config::Settings;
use serde::Serialize;

use crate::line_diff::{EditScript, LineDiffEngine};
use crate::lines::split_lines;

/// Untransformed text, always present.
pub const RAW_STATE: &str = "raw";
/// Transformed text, present only when a transform is configured.
pub const RAW_PLAIN_STATE: &str = "raw_plain";

/// Left and right line sequences of one state, with their counts.
///
/// Counts always equal the sequence lengths; they are recomputed whenever
/// either side changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateLines {
    left: Vec<String>,
    right: Vec<String>,
    count_left: usize,
    count_right: usize,
}

impl StateLines {
    /// Split both texts into lines.
    pub fn new(left_text: &str, right_text: &str) -> Self {
        Self::from_lines(split_lines(left_text), split_lines(right_text))
    }

    pub fn from_lines(left: Vec<String>, right: Vec<String>) -> Self {
        Self {
            count_left: left.len(),
            count_right: right.len(),
            left,
            right,
        }
    }

    pub fn left(&self) -> &[String] {
        &self.left
    }

    pub fn right(&self) -> &[String] {
        &self.right
    }

    pub fn count_left(&self) -> usize {
        self.count_left
    }

    pub fn count_right(&self) -> usize {
        self.count_right
    }

    pub fn set_left(&mut self, lines: Vec<String>) {
        self.count_left = lines.len();
        self.left = lines;
    }

    pub fn set_right(&mut self, lines: Vec<String>) {
        self.count_right = lines.len();
        self.right = lines;
    }

    /// Returns `true` if both sides hold the same lines.
    pub fn is_identical(&self) -> bool {
        self.left == self.right
    }
}

/// The comparison result for one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffState {
    /// Field machine name.
    pub name: String,
    /// Field label, present only when `show_header` is enabled.
    pub label: Option<String>,
    /// Type-level settings of the field.
    pub settings: Settings,
    /// State name → lines. Always holds [`RAW_STATE`].
    pub states: BTreeMap<String, StateLines>,
}

impl DiffState {
    pub fn state(&self, name: &str) -> Option<&StateLines> {
        self.states.get(name)
    }

    /// The untransformed state.
    pub fn raw(&self) -> Option<&StateLines> {
        self.state(RAW_STATE)
    }

    /// The transformed state, if a transform is configured.
    pub fn raw_plain(&self) -> Option<&StateLines> {
        self.state(RAW_PLAIN_STATE)
    }

    /// State names in order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Returns `true` if the raw texts differ.
    pub fn has_changes(&self) -> bool {
        self.raw().is_some_and(|raw| !raw.is_identical())
    }

    /// Run a line-diff engine over one state.
    pub fn edit_script(&self, engine: &dyn LineDiffEngine, state: &str) -> Option<EditScript> {
        self.state(state)
            .map(|lines| engine.diff(lines.left(), lines.right()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_diff::MyersLineDiff;

    fn state_with_raw(left: &str, right: &str) -> DiffState {
        let mut states = BTreeMap::new();
        states.insert(RAW_STATE.to_string(), StateLines::new(left, right));
        DiffState {
            name: "title".into(),
            label: None,
            settings: Settings::new("string"),
            states,
        }
    }

    #[test]
    fn counts_follow_lengths() {
        let lines = StateLines::new("a\nb", "");
        assert_eq!(lines.count_left(), 2);
        assert_eq!(lines.count_right(), 0);
        assert!(lines.right().is_empty());
    }

    #[test]
    fn setters_recompute_counts() {
        let mut lines = StateLines::new("a", "b");
        lines.set_left(vec!["x".into(), "y".into(), "z".into()]);
        lines.set_right(Vec::new());
        assert_eq!(lines.count_left(), 3);
        assert_eq!(lines.count_right(), 0);
    }

    #[test]
    fn has_changes_reads_raw_state() {
        assert!(state_with_raw("Old", "New").has_changes());
        assert!(!state_with_raw("Same", "Same").has_changes());
    }

    #[test]
    fn edit_script_for_known_state_only() {
        let state = state_with_raw("Old", "New");
        let script = state.edit_script(&MyersLineDiff, RAW_STATE).unwrap();
        assert_eq!(script.additions(), 1);
        assert_eq!(script.deletions(), 1);
        assert!(state.edit_script(&MyersLineDiff, RAW_PLAIN_STATE).is_none());
    }

    #[test]
    fn serializes_counts() {
        let json = serde_json::to_value(StateLines::new("a", "")).unwrap();
        assert_eq!(json["count_left"], 1);
        assert_eq!(json["count_right"], 0);
    }
}
