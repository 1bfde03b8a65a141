//! Server configuration: YAML schema plus layered loading.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{BackendConfig, DispatchConfig, HttpConfig, ServerConfig};
