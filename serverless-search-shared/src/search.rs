//! Search query and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A semantic similarity query against a `semantic_text` sub-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticQuery {
    /// Target index.
    pub index: String,
    /// Semantic field to match against (e.g. `short_description.semantic`).
    pub field: String,
    /// Free text to embed and compare.
    pub text: String,
    /// Maximum number of hits to return.
    pub size: usize,
}

impl SemanticQuery {
    pub fn new(
        index: impl Into<String>,
        field: impl Into<String>,
        text: impl Into<String>,
        size: usize,
    ) -> Self {
        Self {
            index: index.into(),
            field: field.into(),
            text: text.into(),
            size,
        }
    }
}

/// A single hit returned by the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index the hit came from.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Relevance score, when the engine reports one.
    pub score: Option<f64>,
    /// The stored document.
    pub source: Value,
}

impl SearchHit {
    /// Read a top-level string field from the stored document.
    pub fn source_str(&self, field: &str) -> Option<&str> {
        self.source.get(field).and_then(Value::as_str)
    }
}
