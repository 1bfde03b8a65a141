//! Template renderer for MCP resources.
//!
//! Each registered resource URI maps to a bundled HTML template. Rendering
//! is pure: the same `(uri, context)` always produces the same bytes.

pub mod context;
mod template;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{ResourceContent, ResourceDescriptor};

pub use template::{render_str, Template};

/// URIs of the bundled templates.
pub mod uris {
    pub const HTML_SEARCH_RESULTS: &str = "html://search-results";
    pub const HTML_FILING_STATUS: &str = "html://filing-status";
    pub const TEMPLATE_SEARCH_RESULTS: &str = "template://search-results";
    pub const TEMPLATE_PRICING_DISPLAY: &str = "template://pricing-display";
}

/// Template source compiled into the binary for `uri`.
pub fn bundled_template(uri: &str) -> Option<&'static str> {
    match uri {
        uris::HTML_SEARCH_RESULTS => Some(include_str!("../../templates/search-results.html")),
        uris::HTML_FILING_STATUS => Some(include_str!("../../templates/filing-status.html")),
        uris::TEMPLATE_SEARCH_RESULTS => {
            Some(include_str!("../../templates/search-results-card.html"))
        }
        uris::TEMPLATE_PRICING_DISPLAY => {
            Some(include_str!("../../templates/pricing-display.html"))
        }
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("render context for {uri} is not serializable: {reason}")]
    Context { uri: String, reason: String },
}

struct Entry {
    descriptor: ResourceDescriptor,
    template: Template,
}

/// Renders registered resources. Templates are parsed once at construction.
pub struct TemplateRenderer {
    entries: HashMap<String, Entry>,
}

impl TemplateRenderer {
    /// Build a renderer for `resources` using the bundled templates.
    ///
    /// Resources without a bundled template are skipped and will report
    /// [`RenderError::NotFound`].
    pub fn new(resources: &[ResourceDescriptor]) -> Self {
        Self::with_sources(resources, |uri| bundled_template(uri).map(str::to_string))
    }

    /// Build a renderer whose template text comes from `source`.
    pub fn with_sources<F>(resources: &[ResourceDescriptor], source: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut entries = HashMap::new();
        for descriptor in resources {
            match source(&descriptor.uri) {
                Some(text) => {
                    entries.insert(
                        descriptor.uri.clone(),
                        Entry {
                            descriptor: descriptor.clone(),
                            template: Template::parse(&text),
                        },
                    );
                }
                None => {
                    tracing::warn!(uri = %descriptor.uri, "no template for registered resource");
                }
            }
        }
        Self { entries }
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Render `uri` against a free-form context.
    pub fn render(&self, uri: &str, context: &Map<String, Value>) -> Result<String, RenderError> {
        let entry = self
            .entries
            .get(uri)
            .ok_or_else(|| RenderError::NotFound(uri.to_string()))?;
        Ok(entry.template.render(context))
    }

    /// Render `uri` against one of the typed contexts in [`context`].
    pub fn render_typed<C: Serialize>(&self, uri: &str, context: &C) -> Result<String, RenderError> {
        let map = match serde_json::to_value(context) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(error) => {
                return Err(RenderError::Context {
                    uri: uri.to_string(),
                    reason: error.to_string(),
                })
            }
        };
        self.render(uri, &map)
    }

    /// Render into an embeddable resource block carrying the declared MIME type.
    pub fn embed<C: Serialize>(&self, uri: &str, context: &C) -> Result<ResourceContent, RenderError> {
        let text = self.render_typed(uri, context)?;
        let mime_type = self
            .entries
            .get(uri)
            .map(|e| e.descriptor.mime_type.clone())
            .unwrap_or_else(|| "text/html".to_string());
        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type,
            text,
        })
    }
}
