//! Backend adapters and the name-keyed registry.
//!
//! One adapter per backend family, registered only when the family's
//! credential or host is present in settings. Registry membership is the
//! sole signal that a backend is available.

mod anthropic;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;

use crate::config::BackendSettings;
use crate::error::GatewayError;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The single contract every backend family implements: one outbound HTTP
/// request per invocation, full parsed response body back, typed error on a
/// non-success status. No retries, no streaming.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn call(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<Value, GatewayError>;
}

/// Name-keyed adapter registry, built once at startup.
pub struct BackendRegistry {
    adapters: HashMap<String, Arc<dyn BackendAdapter>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register one adapter per configured family. Absent credential blocks
    /// are skipped silently.
    pub fn from_settings(settings: &BackendSettings) -> Self {
        let mut registry = Self::new();

        if let Some(openai) = &settings.openai {
            if !openai.api_key.is_empty() {
                registry.register("openai", Arc::new(OpenAiAdapter::new(openai.clone())));
            }
        }
        if let Some(anthropic) = &settings.anthropic {
            if !anthropic.api_key.is_empty() {
                registry.register(
                    "anthropic",
                    Arc::new(AnthropicAdapter::new(anthropic.clone())),
                );
            }
        }
        if let Some(gemini) = &settings.gemini {
            if !gemini.api_key.is_empty() {
                registry.register("gemini", Arc::new(GeminiAdapter::new(gemini.clone())));
            }
        }
        if let Some(ollama) = &settings.ollama {
            if !ollama.host.is_empty() {
                registry.register("ollama", Arc::new(OllamaAdapter::new(ollama.clone())));
            }
        }

        registry
    }

    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn BackendAdapter>) {
        let name = name.into();
        tracing::debug!("Registered backend '{}'", name);
        self.adapters.insert(name, adapter);
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn BackendAdapter>, GatewayError> {
        self.adapters
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                name: name.to_string(),
            })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnthropicSettings, OllamaSettings, OpenAiSettings};

    #[test]
    fn test_empty_settings_register_nothing() {
        let registry = BackendRegistry::from_settings(&BackendSettings::default());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_only_configured_families_register() {
        let settings = BackendSettings {
            openai: Some(OpenAiSettings {
                api_key: "sk-test".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
            }),
            ollama: Some(OllamaSettings {
                host: "http://localhost:11434".to_string(),
            }),
            ..Default::default()
        };

        let registry = BackendRegistry::from_settings(&settings);
        assert_eq!(registry.list(), vec!["ollama", "openai"]);
        assert!(registry.contains("openai"));
        assert!(!registry.contains("anthropic"));
    }

    #[test]
    fn test_empty_credential_is_skipped_silently() {
        let settings = BackendSettings {
            anthropic: Some(AnthropicSettings {
                api_key: String::new(),
                base_url: "https://api.anthropic.com".to_string(),
                version: "2023-06-01".to_string(),
            }),
            ..Default::default()
        };

        let registry = BackendRegistry::from_settings(&settings);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let registry = BackendRegistry::new();
        // The Ok arm holds a trait object without Debug, so match instead of
        // unwrap_err
        let err = match registry.get("openai") {
            Err(err) => err,
            Ok(_) => panic!("expected a NotFound error"),
        };
        match err {
            GatewayError::NotFound { name } => assert_eq!(name, "openai"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
