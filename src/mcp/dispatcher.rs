//! Transport-agnostic request dispatcher.
//!
//! A tool call moves through `Validating → Invoking → Responding`. The name
//! and the arguments are checked before any handler runs, so a rejected call
//! never reaches the backend. Every failure after that point, including a
//! handler timeout or panic, is folded into an `isError` result.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Map, Value};

use crate::backend::Backend;
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::render::TemplateRenderer;
use crate::types::{
    ResourceContent, ResourceDescriptor, ResourceReadResult, ToolDescriptor, ToolInvocation,
    ToolResult,
};

use super::registry::{resource_registry, tool_registry};
use super::tools::{self, ToolContext, ToolKind};

/// Holds read-only state only; share it behind an `Arc`.
pub struct Dispatcher {
    tools: Vec<ToolDescriptor>,
    resources: Vec<ResourceDescriptor>,
    renderer: TemplateRenderer,
    backend: Arc<dyn Backend>,
    tool_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.tools.len())
            .field("resources", &self.resources.len())
            .field("backend", &self.backend.id())
            .field("tool_timeout", &self.tool_timeout)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        tools: Vec<ToolDescriptor>,
        resources: Vec<ResourceDescriptor>,
        renderer: TemplateRenderer,
        backend: Arc<dyn Backend>,
        tool_timeout: Duration,
    ) -> Self {
        Self {
            tools,
            resources,
            renderer,
            backend,
            tool_timeout,
        }
    }

    /// Dispatcher over the built-in registries and bundled templates.
    pub fn with_config(backend: Arc<dyn Backend>, config: &DispatchConfig) -> Self {
        let resources = resource_registry();
        let renderer = TemplateRenderer::new(&resources);
        Self::new(
            tool_registry(),
            resources,
            renderer,
            backend,
            Duration::from_millis(config.tool_timeout_ms),
        )
    }

    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn list_resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.uri == uri)
    }

    /// Run a tool call to completion. Never fails: errors come back as
    /// `isError` results.
    pub async fn call_tool(&self, invocation: ToolInvocation) -> ToolResult {
        match self.try_call_tool(&invocation).await {
            Ok(result) => {
                tracing::debug!(tool = %invocation.name, phase = "responding", "tool succeeded");
                result
            }
            Err(error) => {
                tracing::debug!(
                    tool = %invocation.name,
                    phase = "responding",
                    kind = error.kind(),
                    "tool failed: {error}"
                );
                if matches!(error, DispatchError::Backend(_) | DispatchError::Panicked { .. }) {
                    tracing::warn!(tool = %invocation.name, "{error}");
                }
                error.to_tool_result()
            }
        }
    }

    async fn try_call_tool(&self, invocation: &ToolInvocation) -> Result<ToolResult, DispatchError> {
        tracing::debug!(tool = %invocation.name, phase = "validating");
        let kind = self.validate(invocation)?;

        tracing::debug!(tool = %invocation.name, phase = "invoking");
        let ctx = ToolContext {
            backend: self.backend.as_ref(),
            renderer: &self.renderer,
        };
        let handler = AssertUnwindSafe(tools::invoke(kind, &ctx, &invocation.arguments))
            .catch_unwind();
        match tokio::time::timeout(self.tool_timeout, handler).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(DispatchError::Panicked {
                tool: invocation.name.clone(),
            }),
            Err(_elapsed) => Err(DispatchError::Timeout {
                tool: invocation.name.clone(),
                timeout_ms: u64::try_from(self.tool_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Resolve the tool and check its arguments against the declared schema.
    fn validate(&self, invocation: &ToolInvocation) -> Result<ToolKind, DispatchError> {
        let descriptor = self
            .tool(&invocation.name)
            .ok_or_else(|| DispatchError::UnknownTool(invocation.name.clone()))?;
        let kind = ToolKind::from_name(&descriptor.name)
            .ok_or_else(|| DispatchError::UnknownTool(invocation.name.clone()))?;
        descriptor
            .input_schema
            .validate_arguments(&invocation.arguments)
            .map_err(|e| DispatchError::invalid(&invocation.name, e.to_string()))?;
        Ok(kind)
    }

    /// Render a registered resource against its empty-state context.
    pub fn read_resource(&self, uri: &str) -> Result<ResourceReadResult, DispatchError> {
        let descriptor = self
            .resource(uri)
            .ok_or_else(|| DispatchError::UnknownResource(uri.to_string()))?;
        let text = self.renderer.render(uri, &Map::<String, Value>::new())?;
        tracing::debug!(uri, bytes = text.len(), "resource rendered");
        Ok(ResourceReadResult {
            contents: vec![ResourceContent {
                uri: descriptor.uri.clone(),
                mime_type: descriptor.mime_type.clone(),
                text,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::backend::{
        BackendError, FilingConfirmation, FilingRecord, FilingRequest, SearchRecord,
        SearchRequest, SearchSubmission,
    };
    use serde_json::json;

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Backend for CountingBackend {
        fn id(&self) -> &str {
            "counting"
        }

        async fn submit_search(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchSubmission, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Status {
                status: 503,
                body: "maintenance".into(),
            })
        }

        async fn list_searches(
            &self,
            _email: &str,
            _search_id: Option<&str>,
        ) -> Result<Vec<SearchRecord>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("list_searches exploded");
        }

        async fn create_filing(
            &self,
            _request: &FilingRequest,
        ) -> Result<FilingConfirmation, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(BackendError::Timeout("unreachable".into()))
        }

        async fn get_filings(
            &self,
            _email: &str,
            _filing_id: Option<&str>,
        ) -> Result<Vec<FilingRecord>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn dispatcher(backend: Arc<CountingBackend>, timeout: Duration) -> Dispatcher {
        let resources = resource_registry();
        let renderer = TemplateRenderer::new(&resources);
        Dispatcher::new(tool_registry(), resources, renderer, backend, timeout)
    }

    #[tokio::test]
    async fn schema_failure_short_circuits_before_backend() {
        let backend = Arc::new(CountingBackend::default());
        let d = dispatcher(backend.clone(), Duration::from_secs(1));
        let result = d
            .call_tool(ToolInvocation::from_value("getFiling", json!({"email": 42})))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("expected string, got number"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_status_becomes_error_envelope() {
        let backend = Arc::new(CountingBackend::default());
        let d = dispatcher(backend.clone(), Duration::from_secs(1));
        let result = d
            .call_tool(ToolInvocation::from_value(
                "search_trademark",
                json!({"trademark_name": "Acme", "countries": "US", "email": "a@b.co"}),
            ))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("503"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_panic_is_contained() {
        let backend = Arc::new(CountingBackend::default());
        let d = dispatcher(backend, Duration::from_secs(1));
        let result = d
            .call_tool(ToolInvocation::from_value(
                "check_search_status",
                json!({"email": "a@b.co"}),
            ))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("failed unexpectedly"));
    }

    #[tokio::test]
    async fn slow_handler_times_out() {
        let backend = Arc::new(CountingBackend::default());
        let d = dispatcher(backend, Duration::from_millis(50));
        let result = d
            .call_tool(ToolInvocation::from_value(
                "createFiling",
                json!({
                    "trademarkName": "Acme",
                    "countries": ["US"],
                    "niceClasses": [9],
                    "email": "a@b.co",
                    "fullName": "Ada Lovelace"
                }),
            ))
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.first_text(),
            Some("Error: createFiling timed out after 50 ms")
        );
    }

    #[test]
    fn read_resource_uses_declared_mime_type() {
        let d = dispatcher(Arc::new(CountingBackend::default()), Duration::from_secs(1));
        let read = d.read_resource("template://pricing-display").unwrap();
        assert_eq!(read.contents.len(), 1);
        assert_eq!(read.contents[0].mime_type, "text/html");
        assert!(matches!(
            d.read_resource("html://missing"),
            Err(DispatchError::UnknownResource(_))
        ));
    }
}
