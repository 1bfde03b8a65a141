//! MCP server: Model Context Protocol implementation over stdio and HTTP.
//!
//! - [`registry`]: static tool and resource catalogs
//! - [`tools`]: one handler per tool
//! - [`dispatcher`]: validation, timeout, and error folding around the handlers
//! - [`server`]: rmcp `ServerHandler` and the stdio entry point
//! - [`http`]: HTTP transport (streamable HTTP via axum) plus `/health`

pub mod dispatcher;
pub mod http;
pub mod registry;
pub mod server;
pub mod tools;

pub use dispatcher::Dispatcher;
pub use server::{run_server, TrademarkServer};
