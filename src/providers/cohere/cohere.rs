use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::providers::traits::CompletionProvider;

const CHAT_URL: &str = "https://api.cohere.com/v2/chat";
const MODEL: &str = "command-a-03-2025";
// Low randomness keeps the nutrition commentary factual.
const TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct CohereProvider {
    api_key: String,
    client: Client,
}

impl CohereProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for CohereProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": MODEL,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Cohere chat API returned {}: {}", status, body));
        }

        let body: Value = response.json().await?;
        Ok(extract_message_text(&body))
    }

    fn model(&self) -> &str {
        MODEL
    }
}

/// First content block's text, per the Cohere v2 chat response shape.
/// A successful response without content yields an empty string; the
/// caller decides what to substitute for it.
pub(crate) fn extract_message_text(body: &Value) -> String {
    body.pointer("/message/content/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
