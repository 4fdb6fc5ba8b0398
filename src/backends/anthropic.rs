//! Messages-API family, keyed by a header-based key plus a version header.

use super::BackendAdapter;
use crate::config::AnthropicSettings;
use crate::error::GatewayError;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct AnthropicAdapter {
    client: reqwest::Client,
    settings: AnthropicSettings,
}

impl AnthropicAdapter {
    pub fn new(settings: AnthropicSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, settings }
    }

    /// System messages move to the top-level `system` field; everything else
    /// stays in the messages array.
    fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut converted = Vec::new();

        for msg in messages {
            if msg.role == "system" {
                system_parts.push(msg.content.clone());
            } else {
                converted.push(json!({
                    "role": msg.role,
                    "content": msg.content,
                }));
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, converted)
    }
}

#[async_trait]
impl BackendAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn call(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<Value, GatewayError> {
        let (system, converted) = Self::convert_messages(messages);

        let mut body = json!({
            "model": model,
            "max_tokens": 4096,
            "messages": converted,
        });
        if let Some(system) = system {
            body["system"] = Value::String(system);
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.settings.base_url))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", &self.settings.version)
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
