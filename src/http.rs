//! Shared HTTP helpers for provider, token, and answer backends.

use std::time::Duration;

use regex::Regex;
use tracing::warn;

/// Maximum characters of an upstream error body kept in error values and logs.
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Build a reqwest client with connect and request timeouts.
///
/// Falls back to the default client if the builder fails.
pub fn build_client(connect_timeout: Duration, request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build HTTP client with timeouts, using default");
            reqwest::Client::default()
        })
}

/// Collapse whitespace, redact bearer-looking tokens, and truncate an upstream
/// response body.
pub fn sanitize_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r#"("access_token"\s*:\s*")[^"]+"#,
        r"(Bearer\s+)[A-Za-z0-9_\-\.=]+",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "${1}[REDACTED]").into_owned();
        }
    }

    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
