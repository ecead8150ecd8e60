//! Request body builders.

use serde_json::{json, Value};

use crate::types::BulkDocument;
use serverless_search_shared::SemanticQuery;

/// Build a semantic query body.
///
/// The engine embeds `query.text` with the inference endpoint bound to
/// `query.field` and ranks documents by vector similarity.
pub fn build_semantic_query(query: &SemanticQuery) -> Value {
    json!({
        "size": query.size,
        "query": {
            "semantic": {
                "field": query.field,
                "query": query.text
            }
        }
    })
}

/// Build the action/source line pairs of a bulk request.
///
/// Every document gets an `index` action targeting `index`; ids are left to
/// the engine.
pub fn build_bulk_lines(index: &str, documents: &[BulkDocument]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        lines.push(json!({ "index": { "_index": index } }));
        lines.push(document.source.clone());
    }
    lines
}
