//! In-memory control plane and search engine used by the pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use serverless_search_repository::{
    BulkDocument, BulkIndexSummary, ControlPlaneClient, DocumentOutcome, IndexMapping,
    InferenceEndpoint, ProvisioningError, SearchClientFactory, SearchEngineClient, SearchError,
};
use serverless_search_shared::{
    CreateProjectRequest, ProjectCredentials, ProjectDescriptor, ProjectEndpoints, ProjectPhase,
    ProjectStatus, SearchHit, SemanticQuery,
};

/// Ordered log of remote calls shared by the mocks of one test.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

pub fn test_project() -> ProjectDescriptor {
    ProjectDescriptor {
        id: "proj-1".to_string(),
        name: "demo".to_string(),
        alias: None,
        region_id: "aws-us-east-1".to_string(),
        project_type: Some("elasticsearch".to_string()),
        optimized_for: Default::default(),
        cloud_id: None,
        endpoints: ProjectEndpoints {
            elasticsearch: "https://demo.es.example.io".to_string(),
            kibana: None,
        },
        credentials: ProjectCredentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        },
    }
}

/// Control plane that replays a scripted sequence of phases.
///
/// The last phase repeats once the script is exhausted.
pub struct RecordingControlPlane {
    log: CallLog,
    phases: Vec<ProjectPhase>,
    status_calls: AtomicUsize,
    fail_create: Mutex<Option<u16>>,
    fail_status: Mutex<Option<u16>>,
    fail_delete: Mutex<Option<u16>>,
}

impl RecordingControlPlane {
    pub fn with_phases(phases: &[&str]) -> Self {
        Self::with_log(CallLog::default(), phases)
    }

    pub fn with_log(log: CallLog, phases: &[&str]) -> Self {
        Self {
            log,
            phases: phases.iter().map(|p| ProjectPhase::from(*p)).collect(),
            status_calls: AtomicUsize::new(0),
            fail_create: Mutex::new(None),
            fail_status: Mutex::new(None),
            fail_delete: Mutex::new(None),
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn fail_create_with(&self, status: u16) {
        *self.fail_create.lock().unwrap() = Some(status);
    }

    pub fn fail_status_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn fail_delete_with(&self, status: u16) {
        *self.fail_delete.lock().unwrap() = Some(status);
    }
}

#[async_trait]
impl ControlPlaneClient for RecordingControlPlane {
    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectDescriptor, ProvisioningError> {
        self.log.record("create_project");
        if let Some(status) = *self.fail_create.lock().unwrap() {
            return Err(ProvisioningError::unexpected_status(
                "create project",
                status,
                "mock failure",
            ));
        }
        Ok(ProjectDescriptor {
            name: request.name.clone(),
            region_id: request.region_id.clone(),
            optimized_for: request.optimized_for,
            ..test_project()
        })
    }

    async fn project_status(&self, _project_id: &str) -> Result<ProjectStatus, ProvisioningError> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.log.record("project_status");
        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(ProvisioningError::unexpected_status(
                "get project status",
                status,
                "mock failure",
            ));
        }
        let phase = self
            .phases
            .get(call)
            .or_else(|| self.phases.last())
            .cloned()
            .unwrap_or(ProjectPhase::Initializing);
        Ok(ProjectStatus { phase })
    }

    async fn delete_project(&self, _project_id: &str) -> Result<(), ProvisioningError> {
        self.log.record("delete_project");
        if let Some(status) = *self.fail_delete.lock().unwrap() {
            return Err(ProvisioningError::unexpected_status(
                "delete project",
                status,
                "mock failure",
            ));
        }
        Ok(())
    }
}

/// Search engine that keeps documents in memory.
///
/// Indexed documents only become searchable after `refresh`. Ranking scores a
/// document 1.0 when the queried field contains the query text verbatim and
/// 0.0 otherwise; documents scoring 0.0 are not returned.
#[derive(Default)]
pub struct InMemorySearchEngine {
    log: CallLog,
    pending: Mutex<Vec<(String, Value)>>,
    visible: Mutex<HashMap<String, Vec<(String, Value)>>>,
    next_id: AtomicUsize,
    reject_lines: Mutex<Vec<usize>>,
    fail_inference: Mutex<bool>,
    fail_index: Mutex<bool>,
    fail_bulk: Mutex<bool>,
}

impl InMemorySearchEngine {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Reject documents coming from these input lines.
    pub fn reject_lines(&self, lines: &[usize]) {
        *self.reject_lines.lock().unwrap() = lines.to_vec();
    }

    pub fn fail_inference(&self) {
        *self.fail_inference.lock().unwrap() = true;
    }

    pub fn fail_index_creation(&self) {
        *self.fail_index.lock().unwrap() = true;
    }

    pub fn fail_bulk(&self) {
        *self.fail_bulk.lock().unwrap() = true;
    }

    pub fn visible_count(&self, index: &str) -> usize {
        self.visible
            .lock()
            .unwrap()
            .get(index)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SearchEngineClient for InMemorySearchEngine {
    async fn create_inference_endpoint(
        &self,
        _endpoint: &InferenceEndpoint,
    ) -> Result<(), SearchError> {
        self.log.record("create_inference_endpoint");
        if *self.fail_inference.lock().unwrap() {
            return Err(SearchError::inference("mock failure"));
        }
        Ok(())
    }

    async fn create_index(&self, _index: &str, _mapping: &IndexMapping) -> Result<(), SearchError> {
        self.log.record("create_index");
        if *self.fail_index.lock().unwrap() {
            return Err(SearchError::index_creation("resource_already_exists_exception"));
        }
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<BulkIndexSummary, SearchError> {
        self.log.record("bulk_index");
        if *self.fail_bulk.lock().unwrap() {
            return Err(SearchError::bulk_index("mock failure"));
        }

        let rejected = self.reject_lines.lock().unwrap().clone();
        let mut pending = self.pending.lock().unwrap();
        let summary = documents
            .iter()
            .map(|document| {
                if rejected.contains(&document.line) {
                    return DocumentOutcome::failed(document.line, "mapper_parsing_exception");
                }
                let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
                pending.push((index.to_string(), document.source.clone()));
                DocumentOutcome::succeeded(document.line, Some(id))
            })
            .collect();
        Ok(summary)
    }

    async fn refresh(&self, _index: &str) -> Result<(), SearchError> {
        self.log.record("refresh");
        let mut pending = self.pending.lock().unwrap();
        let mut visible = self.visible.lock().unwrap();
        for (index, source) in pending.drain(..) {
            let docs = visible.entry(index).or_default();
            let id = docs.len().to_string();
            docs.push((id, source));
        }
        Ok(())
    }

    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<SearchHit>, SearchError> {
        self.log.record("semantic_search");
        let base_field = query.field.split('.').next().unwrap_or(&query.field);
        let visible = self.visible.lock().unwrap();

        let mut hits: Vec<SearchHit> = visible
            .get(&query.index)
            .into_iter()
            .flatten()
            .filter_map(|(id, source)| {
                let text = source.get(base_field)?.as_str()?;
                let score = if text.contains(query.text.as_str()) { 1.0 } else { 0.0 };
                (score > 0.0).then(|| SearchHit {
                    index: query.index.clone(),
                    id: id.clone(),
                    score: Some(score),
                    source: source.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(query.size);
        Ok(hits)
    }
}

/// Hands out the same in-memory engine for every project.
pub struct StaticSearchFactory {
    engine: Arc<InMemorySearchEngine>,
    connects: AtomicUsize,
}

impl StaticSearchFactory {
    pub fn new(engine: Arc<InMemorySearchEngine>) -> Self {
        Self {
            engine,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl SearchClientFactory for StaticSearchFactory {
    fn connect(
        &self,
        _project: &ProjectDescriptor,
    ) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.engine.clone())
    }
}
