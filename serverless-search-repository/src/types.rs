//! Request and response types for bulk indexing.

use serde_json::Value;

/// A document ready to be indexed, tagged with the input line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDocument {
    /// 1-based line number in the input stream.
    pub line: usize,
    /// The document body.
    pub source: Value,
}

impl BulkDocument {
    pub fn new(line: usize, source: Value) -> Self {
        Self { line, source }
    }
}

/// Result of indexing a single document.
///
/// This struct represents the outcome of one document within a bulk load: the
/// input line it came from, the id assigned by the engine when indexing
/// succeeded, and the reason when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// 1-based line number in the input stream.
    pub line: usize,
    /// Document id assigned by the engine.
    pub id: Option<String>,
    /// Whether the document was indexed.
    pub success: bool,
    /// Failure reason.
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn succeeded(line: usize, id: Option<String>) -> Self {
        Self {
            line,
            id,
            success: true,
            error: None,
        }
    }

    pub fn failed(line: usize, error: impl Into<String>) -> Self {
        Self {
            line,
            id: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Summary of a bulk operation containing aggregate statistics and individual results.
///
/// Partial failures are reported here rather than as errors, so callers can
/// decide whether a partially loaded dataset is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkIndexSummary {
    /// Total number of documents attempted.
    pub total: usize,
    /// Number of documents indexed.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results, in input order.
    pub results: Vec<DocumentOutcome>,
}

impl BulkIndexSummary {
    /// Record one outcome.
    pub fn push(&mut self, outcome: DocumentOutcome) {
        self.total += 1;
        if outcome.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(outcome);
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BulkIndexSummary) {
        for outcome in other.results {
            self.push(outcome);
        }
    }

    /// Outcomes of rejected documents.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.results.iter().filter(|outcome| !outcome.success)
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

impl FromIterator<DocumentOutcome> for BulkIndexSummary {
    fn from_iter<I: IntoIterator<Item = DocumentOutcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        for outcome in iter {
            summary.push(outcome);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let summary: BulkIndexSummary = vec![
            DocumentOutcome::succeeded(1, Some("a".to_string())),
            DocumentOutcome::failed(2, "mapper_parsing_exception"),
            DocumentOutcome::succeeded(3, None),
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete_success());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].line, 2);
    }

    #[test]
    fn test_summary_merge() {
        let mut first: BulkIndexSummary =
            std::iter::once(DocumentOutcome::succeeded(1, None)).collect();
        let second: BulkIndexSummary =
            std::iter::once(DocumentOutcome::failed(2, "rejected")).collect();

        first.merge(second);

        assert_eq!(first.total, 2);
        assert_eq!(first.succeeded, 1);
        assert_eq!(first.failed, 1);
        assert_eq!(first.results[1].line, 2);
    }
}
