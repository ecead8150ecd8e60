//! Index mappings.
//!
//! This module defines the field mapping used for the news dataset. Text
//! fields that should be searchable by meaning carry a `semantic` sub-field
//! of type `semantic_text`, bound to an inference endpoint by id.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

/// Name of the semantic sub-field added to text fields.
pub const SEMANTIC_SUBFIELD: &str = "semantic";

/// Mapping of a single field, possibly with multi-field sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldMapping>,
}

impl FieldMapping {
    fn of_type(field_type: &str) -> Self {
        Self {
            field_type: field_type.to_string(),
            inference_id: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn text() -> Self {
        Self::of_type("text")
    }

    pub fn keyword() -> Self {
        Self::of_type("keyword")
    }

    pub fn date() -> Self {
        Self::of_type("date")
    }

    /// A `semantic_text` field embedded through the given inference endpoint.
    pub fn semantic_text(inference_id: impl Into<String>) -> Self {
        Self {
            inference_id: Some(inference_id.into()),
            ..Self::of_type("semantic_text")
        }
    }

    /// Add a multi-field sub-field.
    pub fn with_subfield(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.fields.insert(name.into(), mapping);
        self
    }

    pub fn is_semantic(&self) -> bool {
        self.field_type == "semantic_text"
    }
}

/// The `mappings` section of an index creation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexMapping {
    pub properties: BTreeMap<String, FieldMapping>,
}

impl IndexMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level field.
    pub fn with_field(mut self, name: impl Into<String>, mapping: FieldMapping) -> Self {
        self.properties.insert(name.into(), mapping);
        self
    }

    /// Mapping for the news-headline dataset.
    ///
    /// `headline` and `short_description` get a semantic sub-field bound to
    /// `inference_id`; `category` gets a keyword sub-field for exact filters.
    pub fn news_articles(inference_id: &str) -> Self {
        Self::new()
            .with_field("link", FieldMapping::text())
            .with_field(
                "headline",
                FieldMapping::text()
                    .with_subfield(SEMANTIC_SUBFIELD, FieldMapping::semantic_text(inference_id)),
            )
            .with_field(
                "category",
                FieldMapping::text().with_subfield("keyword", FieldMapping::keyword()),
            )
            .with_field(
                "short_description",
                FieldMapping::text()
                    .with_subfield(SEMANTIC_SUBFIELD, FieldMapping::semantic_text(inference_id)),
            )
            .with_field("authors", FieldMapping::text())
            .with_field("date", FieldMapping::date())
    }

    /// Dotted paths of every semantic field (e.g. `headline.semantic`).
    pub fn semantic_fields(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, mapping) in &self.properties {
            if mapping.is_semantic() {
                paths.push(name.clone());
            }
            for (sub_name, sub_mapping) in &mapping.fields {
                if sub_mapping.is_semantic() {
                    paths.push(format!("{}.{}", name, sub_name));
                }
            }
        }
        paths
    }

    /// Inference endpoint ids this mapping depends on.
    pub fn inference_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .properties
            .values()
            .flat_map(|mapping| std::iter::once(mapping).chain(mapping.fields.values()))
            .filter_map(|mapping| mapping.inference_id.as_deref())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Full body of an index creation request.
    pub fn to_body(&self) -> Value {
        json!({ "mappings": self })
    }
}
