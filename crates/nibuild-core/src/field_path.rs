use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldPathSegment {
    Key(String),
    Index(usize),
}

/// Location inside an input document, rendered as `$.nodes[2].parameters.x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<FieldPathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<FieldPathSegment>) -> Self {
        Self { segments }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(FieldPathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(FieldPathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[FieldPathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                FieldPathSegment::Key(key) if is_plain_key(key) => write!(f, ".{key}")?,
                FieldPathSegment::Key(key) => write!(f, "[{key:?}]")?,
                FieldPathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
#[path = "field_path_test.rs"]
mod tests;
