//! Dispatcher-level error taxonomy.
//!
//! Every variant is converted to an in-band `isError` tool result (or, for
//! resource reads, a protocol `resource_not_found` error) before it reaches a
//! transport.

use crate::backend::BackendError;
use crate::observability::redact_secrets;
use crate::render::RenderError;
use crate::types::ToolResult;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("{tool} timed out after {timeout_ms} ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("{tool} failed unexpectedly")]
    Panicked { tool: String },
}

impl DispatchError {
    pub fn invalid(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::UnknownResource(_) => "unknown_resource",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::Backend(_) => "backend",
            Self::Timeout { .. } => "timeout",
            Self::Render(RenderError::NotFound(_)) => "unknown_resource",
            Self::Render(_) => "render",
            Self::Panicked { .. } => "panicked",
        }
    }

    /// The error envelope sent to the caller.
    pub fn to_tool_result(&self) -> ToolResult {
        ToolResult::error(redact_secrets(&format!("Error: {self}")))
    }
}
