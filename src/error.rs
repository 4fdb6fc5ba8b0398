use thiserror::Error;

/// Caller-visible failures of the gateway core.
///
/// Cache failures are deliberately absent: the cache is a best-effort
/// optimization and its errors are logged and swallowed at the source.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The resolved backend has no registered adapter, usually because its
    /// credential or host was missing at startup. Terminal for the call.
    #[error("backend '{backend}' is unavailable; check that its credentials are configured")]
    Configuration { backend: String },

    /// No adapter registered under this name.
    #[error("no backend registered under '{name}'")]
    NotFound { name: String },

    /// The backend answered with a non-success HTTP status. Not retried here.
    #[error("backend '{backend}' returned HTTP {status} {status_text}")]
    Upstream {
        backend: String,
        status: u16,
        status_text: String,
    },

    /// Transport-level failure before any HTTP status was available.
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn upstream(backend: &str, status: reqwest::StatusCode) -> Self {
        Self::Upstream {
            backend: backend.to_string(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
