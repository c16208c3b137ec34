// src/feed/normalize.rs
//! Post normalization: loosely-typed feed records -> "Author (handle): text" lines.

use serde_json::Value;

pub const DEFAULT_DISPLAY_NAME: &str = "Unknown";
pub const DEFAULT_HANDLE: &str = "no-handle";
pub const DEFAULT_TEXT: &str = "no text";

/// The three fields the digest needs from a feed post, with defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub display_name: String,
    pub handle: String,
    pub text: String,
}

impl RawPost {
    /// Total conversion from an arbitrary JSON value.
    ///
    /// Each of `author.displayName`, `author.handle` and `record.text` is looked up
    /// independently; a missing parent object, a missing key or a non-string value
    /// all fall back to the field's placeholder.
    pub fn from_value(v: &Value) -> Self {
        Self {
            display_name: nested_str(v, "author", "displayName")
                .unwrap_or(DEFAULT_DISPLAY_NAME)
                .to_string(),
            handle: nested_str(v, "author", "handle")
                .unwrap_or(DEFAULT_HANDLE)
                .to_string(),
            text: nested_str(v, "record", "text")
                .unwrap_or(DEFAULT_TEXT)
                .to_string(),
        }
    }

    pub fn to_line(&self) -> NormalizedLine {
        NormalizedLine(format!(
            "{} ({}): {}",
            self.display_name, self.handle, self.text
        ))
    }
}

fn nested_str<'a>(v: &'a Value, parent: &str, key: &str) -> Option<&'a str> {
    v.get(parent)?.get(key)?.as_str()
}

/// One formatted post line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine(pub String);

impl NormalizedLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Same length and order as the input.
pub fn normalize_posts(posts: &[Value]) -> Vec<NormalizedLine> {
    posts
        .iter()
        .map(|p| RawPost::from_value(p).to_line())
        .collect()
}

/// Join lines with a single space. Empty iff `lines` is empty.
pub fn build_corpus(lines: &[NormalizedLine]) -> String {
    lines
        .iter()
        .map(NormalizedLine::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
