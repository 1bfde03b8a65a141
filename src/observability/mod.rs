//! Structured logging and output hygiene.
//!
//! - [`init_logging`]: one-time `tracing` setup with `RUST_LOG` support
//! - [`redact_secrets`]: secret pattern redaction for messages that leave
//!   the process (tool error text, logged backend bodies)

use std::sync::OnceLock;

use regex::Regex;
use tracing_subscriber::EnvFilter;

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Defaults to `trademark_mcp=info`. Logs go to stderr: stdout belongs to
/// the stdio transport. Subsequent calls are silently ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trademark_mcp=info"));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

fn secret_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let raw: &[(&str, &str)] = &[
            (
                r#"(?i)(api[_-]?key|apikey)['"]?\s*[:=]\s*['"]?([a-zA-Z0-9_\-]{16,})['"]?"#,
                "$1=***REDACTED***",
            ),
            (
                r#"(?i)(secret|token|password)['"]?\s*[:=]\s*['"]?([^\s'",}]{8,})['"]?"#,
                "$1=***REDACTED***",
            ),
            (
                r"(?i)Bearer\s+[a-zA-Z0-9_\-\.]{16,}",
                "Bearer ***REDACTED***",
            ),
            (r"\bsk[-_][a-zA-Z0-9_\-]{16,}", "***REDACTED***"),
        ];
        raw.iter()
            .filter_map(|(p, r)| Regex::new(p).ok().map(|re| (re, *r)))
            .collect()
    })
}

/// Redact potential secrets from text.
///
/// Replaces patterns that look like API keys, tokens, passwords, and Bearer
/// tokens with `***REDACTED***`.
pub fn redact_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in secret_patterns() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    result
}
