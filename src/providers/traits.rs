use async_trait::async_trait;

/// A chat-completion backend able to turn a system + user prompt into text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in logs and outcome metadata.
    fn name(&self) -> &str;

    async fn chat(&self, message: &str, model: &str, temperature: f64) -> anyhow::Result<String> {
        self.chat_with_system(None, message, model, temperature)
            .await
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;
}
