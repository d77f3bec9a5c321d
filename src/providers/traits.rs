use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One-shot chat completion for a single user prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Identifier of the upstream model handling the completion.
    fn model(&self) -> &str;
}
