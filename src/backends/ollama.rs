//! Local HTTP server family, reachable by host alone. Speaks the
//! OpenAI-compatible chat-completions surface that Ollama exposes.

use super::BackendAdapter;
use crate::config::OllamaSettings;
use crate::error::GatewayError;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OllamaAdapter {
    client: reqwest::Client,
    settings: OllamaSettings,
}

impl OllamaAdapter {
    pub fn new(settings: OllamaSettings) -> Self {
        // Local models can be slow to load into memory
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, settings }
    }
}

#[async_trait]
impl BackendAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn call(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<Value, GatewayError> {
        let mut body = json!({
            "model": model,
            "messages": messages,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
        }

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.settings.host))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(self.name(), status));
        }

        Ok(response.json().await?)
    }
}
