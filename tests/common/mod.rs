//! Shared fixtures for the integration tests: a recording backend double and
//! well-formed arguments for every tool.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use trademark_mcp::backend::{
    Backend, BackendError, FilingConfirmation, FilingRecord, FilingRequest, SearchRecord,
    SearchRequest, SearchSubmission,
};
use trademark_mcp::config::DispatchConfig;
use trademark_mcp::mcp::Dispatcher;

/// How the double answers I/O calls.
#[derive(Debug, Clone, Copy)]
pub enum Mode {
    Healthy,
    Status(u16),
    Slow(Duration),
}

/// Backend double that counts I/O calls and keeps every write request.
pub struct RecordingBackend {
    mode: Mode,
    calls: AtomicUsize,
    searches: Mutex<Vec<SearchRequest>>,
    filings: Mutex<Vec<FilingRequest>>,
}

impl RecordingBackend {
    pub fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
            filings: Mutex::new(Vec::new()),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(Mode::Healthy)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    pub fn filings(&self) -> Vec<FilingRequest> {
        self.filings.lock().unwrap().clone()
    }

    async fn gate(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::Healthy => Ok(()),
            Mode::Status(status) => Err(BackendError::Status {
                status,
                body: "upstream exploded".to_string(),
            }),
            Mode::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl Backend for RecordingBackend {
    fn id(&self) -> &str {
        "recording"
    }

    async fn submit_search(&self, request: &SearchRequest) -> Result<SearchSubmission, BackendError> {
        self.gate().await?;
        self.searches.lock().unwrap().push(request.clone());
        Ok(SearchSubmission {
            search_id: format!("s-{}", self.calls()),
            status: "pending".to_string(),
            available: None,
            message: None,
        })
    }

    async fn list_searches(
        &self,
        _email: &str,
        search_id: Option<&str>,
    ) -> Result<Vec<SearchRecord>, BackendError> {
        self.gate().await?;
        Ok(vec![SearchRecord {
            id: search_id.unwrap_or("s-1").to_string(),
            trademark_name: "Acme".to_string(),
            countries: vec!["United States".to_string()],
            status: "completed".to_string(),
            available: Some(true),
            created_at: Some("2026-02-01T09:00:00Z".to_string()),
        }])
    }

    async fn create_filing(&self, request: &FilingRequest) -> Result<FilingConfirmation, BackendError> {
        self.gate().await?;
        self.filings.lock().unwrap().push(request.clone());
        Ok(FilingConfirmation {
            filing_id: format!("f-{}", self.calls()),
            status: "submitted".to_string(),
            created_at: Some("2026-02-01T09:00:00Z".to_string()),
        })
    }

    async fn get_filings(
        &self,
        _email: &str,
        filing_id: Option<&str>,
    ) -> Result<Vec<FilingRecord>, BackendError> {
        self.gate().await?;
        Ok(vec![FilingRecord {
            id: filing_id.unwrap_or("f-1").to_string(),
            trademark_name: "Acme".to_string(),
            countries: vec!["United States".to_string(), "Germany".to_string()],
            nice_classes: vec![9, 42],
            status: "in_review".to_string(),
            created_at: Some("2026-02-01T09:00:00Z".to_string()),
            updated_at: None,
        }])
    }
}

/// Dispatcher over the real registries and templates, backed by `backend`.
pub fn dispatcher(backend: Arc<RecordingBackend>, tool_timeout_ms: u64) -> Dispatcher {
    Dispatcher::with_config(backend, &DispatchConfig { tool_timeout_ms })
}

/// Complete, well-typed arguments for `tool`.
pub fn valid_arguments(tool: &str) -> Value {
    match tool {
        "check" => json!({
            "trademarkName": "Acme",
            "country": ["United States", "Germany"],
            "email": "ada@example.com",
            "firstName": "Ada"
        }),
        "search_trademark" => json!({
            "trademark_name": "Acme",
            "countries": "United States",
            "email": "ada@example.com"
        }),
        "check_search_status" => json!({ "email": "ada@example.com" }),
        "createFiling" => json!({
            "trademarkName": "Acme",
            "countries": ["United States"],
            "niceClasses": [9, 42],
            "email": "ada@example.com",
            "fullName": "Ada Lovelace"
        }),
        "getFiling" => json!({ "email": "ada@example.com", "filingId": "f-9" }),
        "get_trademark_pricing" => json!({ "countries": ["United States", "Germany"] }),
        _ => json!({}),
    }
}
