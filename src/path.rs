//! Path - slash-delimited collection/document paths and their merge algebra.
//!
//! A path alternates collection and document segments: `users` is a collection,
//! `users/u1` a document, `users/u1/posts` a nested collection. Three segments
//! are special while merging:
//!
//! - `~` resets to the root, discarding everything merged so far,
//! - `.` refers to the current location and is dropped,
//! - `..` steps up one segment.
//!
//! ```
//! use docmap::Path;
//!
//! assert_eq!(Path::merge(["a/b", "..", "c"]).to_string(), "a/c");
//! assert_eq!(Path::merge(["a/b", "~", "c"]).to_string(), "c");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "~";
pub const CURRENT: &str = ".";
pub const PARENT: &str = "..";

/// Joins segments into a normalized path string.
///
/// Each segment is trimmed, backslashes become separators, leading and trailing
/// separators are stripped and empty segments are dropped.
pub fn build_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parts: Vec<String> = Vec::new();
    for segment in segments {
        let normalized = segment.as_ref().trim().replace('\\', "/");
        let stripped = normalized.trim_matches(SEPARATOR);
        if !stripped.is_empty() {
            parts.push(stripped.to_string());
        }
    }
    parts.join("/")
}

/// Splits a path string into segments.
///
/// Empty segments are kept; run the input through [`build_path`] first when a
/// normalized result is wanted.
pub fn to_segments(path: &str) -> Vec<String> {
    path.replace('\\', "/")
        .split(SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// An immutable sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_string(path: &str) -> Self {
        let normalized = build_path([path]);
        if normalized.is_empty() {
            return Self::root();
        }
        Self {
            segments: to_segments(&normalized),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Flattens all parts and folds them left to right, resolving `~`, `.` and `..`.
    ///
    /// A `..` that cannot be resolved (nothing accumulated yet, or only other
    /// unresolved `..`) is kept literally.
    pub fn merge<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Path>,
    {
        let mut merged: Vec<String> = Vec::new();
        let flattened = parts.into_iter().flat_map(|part| part.into().segments);

        for segment in flattened {
            match segment.as_str() {
                ROOT => merged.clear(),
                CURRENT | "" => {}
                PARENT => {
                    if merged.last().map_or(true, |last| last == PARENT) {
                        merged.push(segment);
                    } else {
                        merged.pop();
                    }
                }
                _ => merged.push(segment),
            }
        }

        Self { segments: merged }
    }

    /// Merges `other` onto this path.
    pub fn join(&self, other: impl Into<Path>) -> Self {
        Self::merge([self.clone(), other.into()])
    }

    /// Appends one literal segment without interpreting it.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The path of the document with `id` inside this collection.
    pub fn document(&self, id: Option<&str>) -> Result<Self, MappingError> {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(self.child(id)),
            _ => Err(MappingError::MissingIdentifier {
                context: "document path",
            }),
        }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn document_depth(&self) -> usize {
        self.segments.len() / 2
    }

    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    pub fn is_document(&self) -> bool {
        !self.segments.is_empty() && self.segments.len() % 2 == 0
    }

    pub fn is_root(&self) -> bool {
        self.document_depth() == 0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self::from_string(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self::from_string(&path)
    }
}

impl From<&String> for Path {
    fn from(path: &String) -> Self {
        Self::from_string(path)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}
