//! Loader module for the bootstrap pipeline.
//!
//! Streams newline-delimited JSON records into the search index.

use std::io;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::errors::WorkflowError;
use serverless_search_repository::{
    BulkDocument, BulkIndexSummary, DocumentOutcome, SearchEngineClient,
};

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents sent per bulk request.
    pub batch_size: usize,
    /// Refresh the index after the last batch so queries see the data.
    pub refresh_on_completion: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            refresh_on_completion: true,
        }
    }
}

/// Loader that indexes newline-delimited records into the search engine.
///
/// Every non-blank line is one document. Lines are mapped independently, so
/// a malformed line or a document the engine rejects becomes a failed outcome
/// in the summary instead of aborting the load.
pub struct BulkLoader {
    client: Arc<dyn SearchEngineClient>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new loader with the given client.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_config(client, LoaderConfig::default())
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    /// Load every record of the file at `path` into `index`.
    pub async fn load_file(
        &self,
        path: &Path,
        index: &str,
    ) -> Result<BulkIndexSummary, WorkflowError> {
        let file = File::open(path).await?;
        let lines = LinesStream::new(BufReader::new(file).lines());
        info!(path = %path.display(), index, "Loading records from file");
        self.load(lines, index).await
    }

    /// Load a stream of newline-delimited records into `index`.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexSummary)` - One outcome per non-blank line, in line order
    /// * `Err(WorkflowError)` - Reading the stream, a whole bulk request, or the
    ///   final refresh failed
    #[instrument(skip(self, lines))]
    pub async fn load<S>(&self, mut lines: S, index: &str) -> Result<BulkIndexSummary, WorkflowError>
    where
        S: Stream<Item = io::Result<String>> + Unpin,
    {
        let batch_size = self.config.batch_size.max(1);
        let mut summary = BulkIndexSummary::default();
        let mut pending: Vec<BulkDocument> = Vec::with_capacity(batch_size);
        let mut line_number = 0;

        while let Some(line) = lines.next().await {
            let line = line?;
            line_number += 1;

            let record = line.trim();
            if record.is_empty() {
                continue;
            }

            match parse_record(record) {
                Ok(source) => pending.push(BulkDocument::new(line_number, source)),
                Err(reason) => {
                    warn!(line = line_number, reason = %reason, "Skipping malformed record");
                    summary.push(DocumentOutcome::failed(line_number, reason));
                }
            }

            if pending.len() >= batch_size {
                self.flush(index, &mut pending, &mut summary).await?;
            }
        }

        self.flush(index, &mut pending, &mut summary).await?;

        if self.config.refresh_on_completion {
            self.client.refresh(index).await?;
        }

        summary.results.sort_by_key(|outcome| outcome.line);

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "{} documents indexed",
            summary.succeeded
        );
        Ok(summary)
    }

    async fn flush(
        &self,
        index: &str,
        pending: &mut Vec<BulkDocument>,
        summary: &mut BulkIndexSummary,
    ) -> Result<(), WorkflowError> {
        if pending.is_empty() {
            return Ok(());
        }

        let batch: Vec<BulkDocument> = pending.drain(..).collect();
        debug!(count = batch.len(), "Flushing batch to search index");

        let result = self.client.bulk_index(index, &batch).await?;
        summary.merge(result);
        Ok(())
    }
}

/// Parse one record. Only JSON objects are accepted as documents.
fn parse_record(record: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(record) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("record is not a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}
