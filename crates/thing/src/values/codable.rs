use std::fmt;

use serde::Serialize;

/// A code drawn from a named vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodedValue {
    pub value: String,
    pub family: Option<String>,
    /// Name of the vocabulary, written as the `type` element.
    pub vocabulary: String,
    pub version: Option<String>,
}

impl CodedValue {
    pub fn new(value: impl Into<String>, vocabulary: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            family: None,
            vocabulary: vocabulary.into(),
            version: None,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Free text with zero or more codes that express the same concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodableValue {
    pub text: String,
    pub codes: Vec<CodedValue>,
}

impl CodableValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            codes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: CodedValue) -> Self {
        self.codes.push(code);
        self
    }
}

impl fmt::Display for CodableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for CodableValue {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
