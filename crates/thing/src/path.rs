//! Field paths used to attribute errors to a nested location.

use std::fmt;

use serde::Serialize;

/// Slash-separated location inside a fragment, such as
/// `pregnancy/delivery[1]/baby/weight` or `target-glucose-zone/@name`.
///
/// Repeated elements carry a zero-based index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// A path consisting of a single element name.
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The path of the child element `name`.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    /// The path of the attribute `name` on this element.
    pub fn attribute(&self, name: &str) -> Self {
        self.child(&format!("@{}", name))
    }

    /// The path of the `index`-th occurrence of this (repeated) element.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for FieldPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
