//! Text transforms applied before the `raw_plain` diff state is built.
//!
//! A [`TextTransformPipeline`] maps each [`MarkdownMode`] to a
//! [`TextTransform`]. Every non-identity transform trims trailing newlines
//! from its output.

use std::collections::HashMap;

use revdiff_config::{ConfigError, MarkdownMode};

use crate::error::DiffResult;

/// Tags kept by [`filter_xss`] in its default mode.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "a",
    "em",
    "strong",
    "cite",
    "blockquote",
    "code",
    "ul",
    "ol",
    "li",
    "dl",
    "dt",
    "dd",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "ul", "ol",
    "dl", "dt", "dd", "table",
];

/// URL schemes a kept `href` may use. Scheme-less (relative) URLs are also kept.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

// ---------------------------------------------------------------------------
// TextTransform trait
// ---------------------------------------------------------------------------

/// A single text-to-text transform.
pub trait TextTransform: Send + Sync {
    /// Canonical transform name.
    fn name(&self) -> &str;

    fn apply(&self, text: &str) -> String;
}

/// Strips markup down to visible text.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlToText;

impl TextTransform for HtmlToText {
    fn name(&self) -> &str {
        "html_to_text"
    }

    fn apply(&self, text: &str) -> String {
        html_to_text(text)
    }
}

/// Sanitizes markup against a tag allow-list.
#[derive(Clone, Debug)]
pub struct FilterXss {
    name: &'static str,
    allowed: Vec<String>,
}

impl FilterXss {
    /// Keep the [`DEFAULT_ALLOWED_TAGS`].
    pub fn default_tags() -> Self {
        Self {
            name: "filter_xss",
            allowed: DEFAULT_ALLOWED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Keep no tags at all.
    pub fn strict() -> Self {
        Self {
            name: "filter_xss_strict",
            allowed: Vec::new(),
        }
    }
}

impl TextTransform for FilterXss {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, text: &str) -> String {
        let allowed: Vec<&str> = self.allowed.iter().map(String::as_str).collect();
        filter_xss(text, &allowed)
    }
}

// ---------------------------------------------------------------------------
// TextTransformPipeline
// ---------------------------------------------------------------------------

/// Dispatches a configured [`MarkdownMode`] to its transform.
pub struct TextTransformPipeline {
    transforms: HashMap<MarkdownMode, Box<dyn TextTransform>>,
}

impl TextTransformPipeline {
    /// A pipeline with no transforms; only [`MarkdownMode::None`] applies.
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// The built-in transforms for every mode.
    pub fn with_default_transforms() -> Self {
        let mut pipeline = Self::empty();
        pipeline.register(MarkdownMode::HtmlToText, Box::new(HtmlToText));
        pipeline.register(MarkdownMode::FilterXss, Box::new(FilterXss::default_tags()));
        pipeline.register(MarkdownMode::FilterXssStrict, Box::new(FilterXss::strict()));
        pipeline
    }

    /// Register (or replace) the transform for a mode.
    pub fn register(&mut self, mode: MarkdownMode, transform: Box<dyn TextTransform>) {
        self.transforms.insert(mode, transform);
    }

    /// Apply the transform for `mode`. [`MarkdownMode::None`] is the identity.
    pub fn apply(&self, mode: MarkdownMode, text: &str) -> DiffResult<String> {
        if mode.is_none() {
            return Ok(text.to_string());
        }
        let transform = self
            .transforms
            .get(&mode)
            .ok_or_else(|| ConfigError::UnknownTransform(mode.as_str().to_string()))?;
        Ok(transform.apply(text))
    }

    /// Apply a transform by name; unknown names are configuration errors.
    pub fn apply_named(&self, name: &str, text: &str) -> DiffResult<String> {
        let mode: MarkdownMode = name.parse()?;
        self.apply(mode, text)
    }
}

impl Default for TextTransformPipeline {
    fn default() -> Self {
        Self::with_default_transforms()
    }
}

impl std::fmt::Debug for TextTransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.transforms.values().map(|t| t.name()).collect();
        names.sort_unstable();
        f.debug_struct("TextTransformPipeline")
            .field("transforms", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Markup scanning
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Tag {
        name: String,
        closing: bool,
        attrs: &'a str,
    },
    Comment,
    /// A `<` that does not open a tag.
    StrayLt,
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        if lt > 0 {
            tokens.push(Token::Text(&rest[..lt]));
        }
        let after = &rest[lt..];

        if let Some(body) = after.strip_prefix("<!--") {
            tokens.push(Token::Comment);
            rest = match body.find("-->") {
                Some(end) => &body[end + 3..],
                None => "",
            };
            continue;
        }

        match after.find('>').and_then(|gt| parse_tag(&after[1..gt]).map(|tag| (gt, tag))) {
            Some((gt, (name, closing, attrs))) => {
                tokens.push(Token::Tag {
                    name,
                    closing,
                    attrs,
                });
                rest = &after[gt + 1..];
            }
            None => {
                tokens.push(Token::StrayLt);
                rest = &after[1..];
            }
        }
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

/// Parse the inside of `<...>` into (lowercased name, closing, attributes).
fn parse_tag(body: &str) -> Option<(String, bool, &str)> {
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    if name_len == 0 || !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let attrs = body[name_len..].trim().trim_end_matches('/').trim_end();
    Some((body[..name_len].to_ascii_lowercase(), closing, attrs))
}

/// Split an attribute string into (lowercased name, raw value) pairs.
///
/// Values may be double-quoted, single-quoted or bare. Attributes without
/// a value get an empty one.
fn parse_attrs(attrs: &str) -> Vec<(String, &str)> {
    let mut out = Vec::new();
    let mut rest = attrs.trim_start();

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c == '=' || c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        if name_len == 0 {
            // Stray `=`.
            rest = rest[1..].trim_start();
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let Some(after_eq) = rest.strip_prefix('=') else {
            out.push((name, ""));
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, remaining) = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &after_eq[1..];
                match inner.find(quote) {
                    Some(end) => (&inner[..end], &inner[end + 1..]),
                    None => (inner, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(|c: char| c.is_ascii_whitespace())
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        out.push((name, value));
        rest = remaining.trim_start();
    }
    out
}

/// Whether a decoded URL is relative or uses one of the [`SAFE_SCHEMES`].
///
/// ASCII whitespace and control characters are ignored, the way browsers
/// ignore them when reading a scheme.
fn is_safe_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    match compact.find([':', '/', '?', '#']) {
        Some(at) if compact[at..].starts_with(':') => {
            let scheme = compact[..at].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

/// The `href` of an anchor's attributes, decoded and re-escaped for a
/// double-quoted attribute, or `None` when missing or unsafe.
fn safe_href(attrs: &str) -> Option<String> {
    let (_, raw) = parse_attrs(attrs)
        .into_iter()
        .find(|(name, _)| name == "href")?;
    let url = decode_entities(raw);
    let url = url.trim();
    if url.is_empty() || !is_safe_url(url) {
        return None;
    }
    Some(escape_attr(url))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn trim_trailing_newlines(mut text: String) -> String {
    let len = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(len);
    text
}

/// Remove every tag not in `allowed`, keeping text content.
///
/// Kept tags lose their attributes, except an `href` on `a` that is
/// relative or uses an http, https or mailto scheme. A stray `<` is
/// escaped. Trailing newlines are trimmed.
pub fn filter_xss(text: &str, allowed: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());

    for token in tokenize(text) {
        match token {
            Token::Text(t) => out.push_str(t),
            Token::StrayLt => out.push_str("&lt;"),
            Token::Comment => {}
            Token::Tag {
                name,
                closing,
                attrs,
            } => {
                if !allowed.contains(&name.as_str()) {
                    continue;
                }
                if closing {
                    out.push_str(&format!("</{name}>"));
                } else if name == "a" {
                    match safe_href(attrs) {
                        Some(href) => out.push_str(&format!("<a href=\"{href}\">")),
                        None => out.push_str("<a>"),
                    }
                } else {
                    out.push_str(&format!("<{name}>"));
                }
            }
        }
    }

    trim_trailing_newlines(out)
}

/// Reduce markup to its visible text.
///
/// Script and style bodies are dropped, `<br>` and block-level closers
/// become line breaks, common entities are decoded, trailing spaces are
/// trimmed per line, and runs of blank lines collapse to one.
pub fn html_to_text(text: &str) -> String {
    let mut raw = String::with_capacity(text.len());
    let mut skipping: Option<String> = None;

    for token in tokenize(text) {
        if let Some(open) = &skipping {
            if let Token::Tag {
                name,
                closing: true,
                ..
            } = &token
            {
                if name == open {
                    skipping = None;
                }
            }
            continue;
        }
        match token {
            Token::Text(t) => raw.push_str(&decode_entities(t)),
            Token::StrayLt => raw.push('<'),
            Token::Comment => {}
            Token::Tag { name, closing, .. } => {
                if !closing && (name == "script" || name == "style") {
                    skipping = Some(name);
                } else if name == "br" || (closing && BLOCK_TAGS.contains(&name.as_str())) {
                    raw.push('\n');
                }
            }
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    for line in raw.split('\n').map(str::trim_end) {
        let blank = line.is_empty();
        if blank && lines.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    trim_trailing_newlines(lines.join("\n"))
}

/// Decode named (`&amp;`, `&lt;`, ...) and numeric (`&#106;`, `&#x6A;`)
/// character references. Anything else is left as written.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let reference = after
            .find(';')
            .filter(|&semi| semi <= MAX_REFERENCE_LEN)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (semi, c)));
        match reference {
            Some((semi, c)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const MAX_REFERENCE_LEN: usize = 10;

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "colon" => Some(':'),
        "tab" => Some('\t'),
        "newline" => Some('\n'),
        _ => None,
    }
}
