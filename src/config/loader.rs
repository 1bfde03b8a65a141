//! Multi-source configuration loading.
//!
//! Priority, lowest first: built-in defaults, the user config file
//! (`<config dir>/trademark-mcp/config.yaml`), the project file
//! `.trademark-mcp.yaml`, an explicit `--config` file, then environment
//! variables. Files are deep-merged key by key.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::schema::ServerConfig;

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".trademark-mcp.yaml";

pub const ENV_API_URL: &str = "TRADEMARK_MCP_API_URL";
pub const ENV_API_KEY: &str = "TRADEMARK_MCP_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "TRADEMARK_MCP_TIMEOUT_MS";
pub const ENV_TOOL_TIMEOUT_MS: &str = "TRADEMARK_MCP_TOOL_TIMEOUT_MS";
pub const ENV_HTTP_BIND: &str = "TRADEMARK_MCP_HTTP_BIND";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Path of the per-user config file, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "trademark", "trademark-mcp")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Load the effective config from every source.
///
/// Missing global/project files are skipped; a missing `explicit` file is an
/// error.
pub fn load_config(
    explicit: Option<&Path>,
    project_root: Option<&Path>,
) -> Result<ServerConfig, ConfigError> {
    let mut optional = Vec::new();
    if let Some(global) = global_config_path() {
        optional.push(global);
    }
    if let Some(root) = project_root {
        optional.push(root.join(PROJECT_CONFIG_FILE));
    }
    load_from_sources(&optional, explicit, |key| std::env::var(key).ok())
}

/// Merge the given files and environment into a validated config.
///
/// `env` is a lookup function so callers (and tests) control the
/// environment without mutating the process.
pub fn load_from_sources<F>(
    optional_files: &[PathBuf],
    explicit: Option<&Path>,
    env: F,
) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = Value::Mapping(Default::default());

    for path in optional_files {
        if path.is_file() {
            merge_yaml(&mut merged, read_yaml(path)?);
            tracing::debug!(path = %path.display(), "loaded config file");
        }
    }
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        merge_yaml(&mut merged, read_yaml(path)?);
        tracing::debug!(path = %path.display(), "loaded explicit config file");
    }

    let mut config: ServerConfig =
        serde_yaml::from_value(merged).map_err(|source| ConfigError::Parse {
            path: explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("<merged>")),
            source,
        })?;
    apply_env_overrides(&mut config, env);
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

fn read_yaml(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively merge `overlay` into `base`. Mappings merge per key; any other
/// overlay value replaces the base value. A null overlay leaves base as is.
fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

/// Apply `TRADEMARK_MCP_*` environment overrides.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = url.trim().to_string();
    }
    if let Some(key) = env(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.backend.api_key = Some(key.trim().to_string());
    }
    if let Some(ms) = parse_u64_env(&env, ENV_TIMEOUT_MS) {
        config.backend.timeout_ms = ms;
    }
    if let Some(ms) = parse_u64_env(&env, ENV_TOOL_TIMEOUT_MS) {
        config.dispatch.tool_timeout_ms = ms;
    }
    if let Some(bind) = env(ENV_HTTP_BIND).filter(|v| !v.trim().is_empty()) {
        config.http.bind = bind.trim().to_string();
    }
}

fn parse_u64_env<F>(env: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable numeric env override");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
