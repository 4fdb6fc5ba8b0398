//! The public entry point: resolves backend/model, builds the prompt, serves
//! from cache or invokes the backend, and normalizes the result.

use crate::backends::BackendRegistry;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::GatewayError;
use crate::prompt::PromptManager;
use crate::routing::{RouteInput, RuleEngine};
use serde_json::{json, Value};

/// Fixed system-segment note when the caller supplies tools; the router never
/// inspects tool schemas.
const TOOLS_NOTE: &str = "Tool calls are available for this request.";

/// One caller-facing query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub query: String,
    pub task: Option<String>,
    pub mime: Option<String>,
    /// Opaque tool specs, passed through to the backend adapter.
    pub tools: Vec<Value>,
    /// Extra discriminators mixed into the cache key.
    pub cache_key_extras: Option<Value>,
    /// Prior cached context offered to the prompt builder.
    pub cache_context: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub text: String,
    pub backend: String,
    pub model: String,
}

/// Orchestrates one linear pipeline per call; holds no per-request state and
/// is safe to share across concurrent requests.
pub struct Router {
    config: Config,
    rules: RuleEngine,
    cache: CacheManager,
    registry: BackendRegistry,
}

impl Router {
    pub fn new(config: Config) -> Self {
        let registry = BackendRegistry::from_settings(&config.backends);
        Self::with_registry(config, registry)
    }

    /// Build with an explicit registry; tests register adapters directly.
    pub fn with_registry(config: Config, registry: BackendRegistry) -> Self {
        let rules = RuleEngine::new(config.rules.clone(), config.default_backend.clone());
        let cache = CacheManager::from_config(&config.cache);

        Self {
            config,
            rules,
            cache,
            registry,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Resolve the backend and model for a request without calling out.
    pub fn resolve(&self, req: &QueryRequest) -> (String, String) {
        let choice = self.rules.choose(&RouteInput {
            query: &req.query,
            task: req.task.as_deref(),
            mime: req.mime.as_deref(),
        });

        let backend = choice
            .backend
            .unwrap_or_else(|| self.config.default_backend.clone());
        let model = choice
            .model
            .unwrap_or_else(|| self.config.default_model.clone());

        (backend, model)
    }

    /// Handle one query end to end.
    pub async fn handle_query(&self, req: QueryRequest) -> Result<QueryResponse, GatewayError> {
        let (backend, model) = self.resolve(&req);

        // Availability gate, before any cache or backend I/O
        if !self.registry.contains(&backend) {
            return Err(GatewayError::Configuration { backend });
        }

        let tools_note = (!req.tools.is_empty()).then_some(TOOLS_NOTE);
        let prompt = PromptManager::build(
            &req.query,
            &self.config.prompt,
            req.cache_context.as_deref(),
            tools_note,
        );
        tracing::debug!(
            fingerprint = %prompt.fingerprint,
            approx_tokens = prompt.approx_tokens,
            "prompt built"
        );

        let cache_key = cache_key(
            &prompt.fingerprint,
            &backend,
            &model,
            req.cache_key_extras.as_ref(),
        );

        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Some(text) = cached.get("text").and_then(Value::as_str) {
                if !text.is_empty() {
                    tracing::debug!(backend = %backend, model = %model, "cache hit");
                    return Ok(QueryResponse {
                        text: text.to_string(),
                        backend,
                        model,
                    });
                }
            }
        }

        let adapter = self.registry.get(&backend)?;
        let result = adapter.call(&model, &prompt.messages, &req.tools).await?;
        let text = extract_text(&result);

        // Only reached after a successful extraction; a canceled call never
        // writes an entry
        self.cache.set(&cache_key, &json!({ "text": text })).await;

        tracing::info!(backend = %backend, model = %model, "query completed");

        Ok(QueryResponse {
            text,
            backend,
            model,
        })
    }
}

/// Canonical serialization of the full cache identity. Two requests that
/// differ in backend or model never share an entry, even with an identical
/// prompt.
fn cache_key(fingerprint: &str, backend: &str, model: &str, extras: Option<&Value>) -> String {
    json!({
        "fingerprint": fingerprint,
        "backend": backend,
        "model": model,
        "extras": extras.cloned().unwrap_or(Value::Null),
    })
    .to_string()
}

/// Normalize a backend response to plain text. Backend families shape their
/// success payloads differently; the first strategy that yields a non-empty
/// value wins, and an unrecognized shape degrades to the raw serialized body.
fn extract_text(result: &Value) -> String {
    // Direct text field
    if let Some(text) = result.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    // First content-block text (messages API shape)
    if let Some(text) = result
        .pointer("/content/0/text")
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    // First choice's message content (chat-completions shape)
    if let Some(text) = result
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    // First candidate part (generate-content shape)
    if let Some(text) = result
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    result.to_string()
}
