//! Text to line-sequence conversion shared by every diff state.

/// Split text on `\n` into the line sequence handed to the line-diff engine.
///
/// The empty string yields zero lines rather than one empty line, so an
/// absent side never shows up as a replaced blank line.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}
