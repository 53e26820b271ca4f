//! Parse errors for the shared vocabularies.

use thiserror::Error;

/// Failure to parse a wire name into one of the shared enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseVocabularyError {
    /// Vocabulary being parsed (e.g. "shipment status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseVocabularyError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
