use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix on a segment meaning "descend into this array and take its first element".
pub const ARRAY_MARKER: &str = "[]";
pub const PATH_SEPARATOR: char = '.';
/// Returned when a path does not resolve.
pub const EMPTY_MARKER: &str = "";

/// Dot-separated address into a JSON document, e.g. `quote.price` or `items[].id`.
///
/// Paths are plain text and never hold a reference to the document they were
/// discovered in, so the same path can be applied to any later fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        segments(&self.0)
    }

    /// Number of non-empty segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Child path `self.key`, or just `key` for an empty parent.
    pub fn child(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}{}{}", self.0, PATH_SEPARATOR, key))
        }
    }

    /// Same path with the array marker appended to its final segment.
    pub fn first_of(&self) -> Self {
        Self(format!("{}{}", self.0, ARRAY_MARKER))
    }

    /// Final segment with the array marker stripped, used for labels.
    pub fn leaf_key(&self) -> &str {
        self.0
            .rsplit(PATH_SEPARATOR)
            .next()
            .map(|last| last.strip_suffix(ARRAY_MARKER).unwrap_or(last))
            .unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain object key (or array index when numeric).
    Key(&'a str),
    /// `key[]`: descend into `key` (skipped when empty) then take the first element.
    FirstOf(&'a str),
}

/// Splits a path into segments. Empty segments from leading, trailing or
/// doubled separators are skipped.
pub fn segments(path: &str) -> impl Iterator<Item = Segment<'_>> {
    path.split(PATH_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(|part| match part.strip_suffix(ARRAY_MARKER) {
            Some(key) => Segment::FirstOf(key),
            None => Segment::Key(part),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_and_marked_segments() {
        let parsed: Vec<_> = segments("data.items[].price").collect();
        assert_eq!(
            parsed,
            vec![
                Segment::Key("data"),
                Segment::FirstOf("items"),
                Segment::Key("price"),
            ]
        );
    }

    #[test]
    fn skips_empty_segments() {
        let parsed: Vec<_> = segments(".a..b.").collect();
        assert_eq!(parsed, vec![Segment::Key("a"), Segment::Key("b")]);
        assert_eq!(segments("").count(), 0);
    }

    #[test]
    fn bare_marker_has_empty_key() {
        let parsed: Vec<_> = segments("[].id").collect();
        assert_eq!(parsed, vec![Segment::FirstOf(""), Segment::Key("id")]);
    }

    #[test]
    fn builds_child_paths() {
        let root = FieldPath::new("");
        let quote = root.child("quote");
        assert_eq!(quote.as_str(), "quote");
        assert_eq!(quote.first_of().child("bid").as_str(), "quote[].bid");
        assert_eq!(FieldPath::new("a.b[].c").depth(), 3);
    }

    #[test]
    fn leaf_key_strips_marker() {
        assert_eq!(FieldPath::new("data.items[]").leaf_key(), "items");
        assert_eq!(FieldPath::new("lastPrice").leaf_key(), "lastPrice");
    }
}
