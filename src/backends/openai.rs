//! Chat-completions family, keyed by a bearer token.

use super::BackendAdapter;
use crate::config::OpenAiSettings;
use crate::error::GatewayError;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiAdapter {
    pub fn new(settings: OpenAiSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, settings }
    }
}

#[async_trait]
impl BackendAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
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
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
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
