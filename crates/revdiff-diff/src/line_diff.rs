//! Line-level diff contract and its default implementation.
//!
//! The rendering layer receives aligned line sequences from a [`DiffState`]
//! and turns them into an [`EditScript`] through a [`LineDiffEngine`]. The
//! default engine uses the `similar` crate (Myers diff algorithm).
//!
//! [`DiffState`]: crate::state::DiffState

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag};

/// Produces an edit script between two ordered line sequences.
///
/// The trait is object-safe and `Send + Sync` so an engine can be shared by
/// concurrent comparisons.
pub trait LineDiffEngine: Send + Sync {
    fn diff(&self, a: &[String], b: &[String]) -> EditScript;
}

/// One run of lines in an edit script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Lines identical on both sides.
    Copy { lines: Vec<String> },
    /// Lines present only in `b`.
    Add { lines: Vec<String> },
    /// Lines present only in `a`.
    Delete { lines: Vec<String> },
    /// A run of `a` lines replaced by a run of `b` lines.
    Change {
        orig: Vec<String>,
        closing: Vec<String>,
    },
}

/// A single line of an edit script, flattened for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// A line present in both sides (context).
    Context(&'a str),
    /// A line added on the right side.
    Added(&'a str),
    /// A line removed from the left side.
    Removed(&'a str),
}

/// The ordered operations turning `a` into `b`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    pub ops: Vec<EditOp>,
}

impl EditScript {
    /// Returns `true` if the script contains only copies.
    pub fn is_identical(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, EditOp::Copy { .. }))
    }

    /// Number of lines only in `b`, counting the closing side of changes.
    pub fn additions(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Add { lines } => lines.len(),
                EditOp::Change { closing, .. } => closing.len(),
                _ => 0,
            })
            .sum()
    }

    /// Number of lines only in `a`, counting the original side of changes.
    pub fn deletions(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Delete { lines } => lines.len(),
                EditOp::Change { orig, .. } => orig.len(),
                _ => 0,
            })
            .sum()
    }

    /// Flatten the script into display lines; changes list removals first.
    pub fn lines(&self) -> Vec<DiffLine<'_>> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                EditOp::Copy { lines } => {
                    out.extend(lines.iter().map(|l| DiffLine::Context(l.as_str())));
                }
                EditOp::Add { lines } => {
                    out.extend(lines.iter().map(|l| DiffLine::Added(l.as_str())));
                }
                EditOp::Delete { lines } => {
                    out.extend(lines.iter().map(|l| DiffLine::Removed(l.as_str())));
                }
                EditOp::Change { orig, closing } => {
                    out.extend(orig.iter().map(|l| DiffLine::Removed(l.as_str())));
                    out.extend(closing.iter().map(|l| DiffLine::Added(l.as_str())));
                }
            }
        }
        out
    }
}

/// Myers line diff backed by `similar`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MyersLineDiff;

impl LineDiffEngine for MyersLineDiff {
    fn diff(&self, a: &[String], b: &[String]) -> EditScript {
        let ops = similar::capture_diff_slices(Algorithm::Myers, a, b)
            .iter()
            .map(|op| {
                let (tag, old, new) = op.as_tag_tuple();
                match tag {
                    DiffTag::Equal => EditOp::Copy {
                        lines: a[old].to_vec(),
                    },
                    DiffTag::Delete => EditOp::Delete {
                        lines: a[old].to_vec(),
                    },
                    DiffTag::Insert => EditOp::Add {
                        lines: b[new].to_vec(),
                    },
                    DiffTag::Replace => EditOp::Change {
                        orig: a[old].to_vec(),
                        closing: b[new].to_vec(),
                    },
                }
            })
            .collect();
        EditScript { ops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split_lines;

    fn diff(a: &str, b: &str) -> EditScript {
        MyersLineDiff.diff(&split_lines(a), &split_lines(b))
    }

    #[test]
    fn identical_sequences_only_copy() {
        let script = diff("a\nb", "a\nb");
        assert!(script.is_identical());
        assert_eq!(script.additions(), 0);
        assert_eq!(script.deletions(), 0);
    }

    #[test]
    fn empty_against_empty_has_no_ops() {
        let script = diff("", "");
        assert!(script.ops.is_empty());
        assert!(script.is_identical());
    }

    #[test]
    fn empty_to_content_is_pure_addition() {
        let script = diff("", "New");
        assert_eq!(
            script.ops,
            vec![EditOp::Add {
                lines: vec!["New".into()]
            }]
        );
    }

    #[test]
    fn content_to_empty_is_pure_deletion() {
        let script = diff("Draft", "");
        assert_eq!(script.deletions(), 1);
        assert_eq!(script.additions(), 0);
    }

    #[test]
    fn single_line_modification_removes_and_adds() {
        let script = diff("Old", "New");
        assert!(!script.is_identical());
        assert_eq!(script.additions(), 1);
        assert_eq!(script.deletions(), 1);
    }

    #[test]
    fn multi_value_change_keeps_shared_prefix() {
        let script = diff("a\nb", "a\nc");
        assert_eq!(
            script.ops.first(),
            Some(&EditOp::Copy {
                lines: vec!["a".into()]
            })
        );
        assert_eq!(script.additions(), 1);
        assert_eq!(script.deletions(), 1);
    }

    #[test]
    fn display_lines_order_removals_before_additions() {
        let script = diff("x\nold\ny", "x\nnew\ny");
        let lines = script.lines();
        assert_eq!(
            lines,
            vec![
                DiffLine::Context("x"),
                DiffLine::Removed("old"),
                DiffLine::Added("new"),
                DiffLine::Context("y"),
            ]
        );
    }
}
