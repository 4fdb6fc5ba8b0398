//! Generate-content family, keyed by a query-string API key.

use super::BackendAdapter;
use crate::config::GeminiSettings;
use crate::error::GatewayError;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct GeminiAdapter {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiAdapter {
    pub fn new(settings: GeminiSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, settings }
    }

    /// System messages become the `systemInstruction`; user/assistant turns
    /// map onto the user/model contents array.
    fn convert_messages(messages: &[ChatMessage]) -> (Option<Value>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => system_parts.push(json!({ "text": msg.content })),
                "assistant" => contents.push(json!({
                    "role": "model",
                    "parts": [{ "text": msg.content }],
                })),
                _ => contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": msg.content }],
                })),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(json!({ "parts": system_parts }))
        };

        (system, contents)
    }
}

#[async_trait]
impl BackendAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn call(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<Value, GatewayError> {
        let (system, contents) = Self::convert_messages(messages);

        let mut body = json!({ "contents": contents });
        if let Some(system) = system {
            body["systemInstruction"] = system;
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, model
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.settings.api_key.as_str())])
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
