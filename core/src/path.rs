//! URL path as an ordered list of segments.
//!
//! Segments are stored and replayed verbatim: `.` and `..` are not resolved
//! and repeated slashes produce empty segments, so `append` followed by
//! `to_string` reproduces its input exactly.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append segments. Strings are split on `/`; another `Path` or a list
    /// of segments is concatenated as-is.
    pub fn append(&mut self, segments: impl Into<Path>) -> &mut Self {
        self.segments.extend(segments.into().segments);
        self
    }

    /// A path is absolute when its first segment is empty, i.e. its string
    /// form started with `/`.
    pub fn is_absolute(&self) -> bool {
        self.segments.first().is_some_and(|s| s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        Self {
            segments: path.split('/').map(str::to_string).collect(),
        }
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Path::from(path.as_str())
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl<S: Into<String>> From<Vec<S>> for Path {
    fn from(segments: Vec<S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}
