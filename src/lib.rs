//! trademark-mcp: MCP tool server for trademark search and filing.
//!
//! Exposes a fixed tool and resource catalog to MCP clients over stdio or
//! streamable HTTP, validates arguments against declared schemas, calls the
//! trademark backend, and renders results as text plus HTML widgets.

pub mod backend;
pub mod config;
pub mod error;
pub mod mcp;
pub mod observability;
pub mod render;
pub mod schema;
pub mod types;
