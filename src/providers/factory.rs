use super::anthropic::AnthropicProvider;
use super::ollama::OllamaProvider;
use super::reliable::RetryingProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::error::GenerationUnavailable;
use crate::prompt::ComposedPrompt;
use strum::Display;

/// Sampling temperature for local models, which have no per-backend setting.
const OLLAMA_TEMPERATURE: f64 = 0.7;
/// Summaries and proofreading should stay close to their input.
const EDIT_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    Anthropic,
    Ollama,
}

/// The generation strategy picked once per process from configuration.
pub struct Backend {
    kind: BackendKind,
    model: String,
    temperature: f64,
    provider: Box<dyn Provider>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl Backend {
    pub fn new(
        kind: BackendKind,
        model: impl Into<String>,
        temperature: f64,
        provider: Box<dyn Provider>,
    ) -> Self {
        Self {
            kind,
            model: model.into(),
            temperature,
            provider,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Draft generation call at the configured temperature.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> anyhow::Result<String> {
        self.call(prompt, self.temperature).await
    }

    /// Low-temperature call for summaries and proofreading.
    pub async fn edit(&self, prompt: &ComposedPrompt) -> anyhow::Result<String> {
        self.call(prompt, EDIT_TEMPERATURE).await
    }

    async fn call(&self, prompt: &ComposedPrompt, temperature: f64) -> anyhow::Result<String> {
        let text = self
            .provider
            .chat_with_system(Some(&prompt.system), &prompt.user, &self.model, temperature)
            .await?;
        Ok(text.trim().to_string())
    }
}

/// Which backend `select_backend` would pick, without building clients.
pub fn describe_backend(config: &Config) -> Option<(BackendKind, String)> {
    if config.anthropic.has_key() {
        return Some((BackendKind::Anthropic, config.anthropic.model.clone()));
    }
    config
        .ollama
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| (BackendKind::Ollama, m.to_string()))
}

/// Anthropic when a key is present, else Ollama when a model is configured.
pub fn select_backend(config: &Config) -> Result<Backend, GenerationUnavailable> {
    let (kind, model) = describe_backend(config).ok_or(GenerationUnavailable)?;

    let (provider, temperature): (Box<dyn Provider>, f64) = match kind {
        BackendKind::Anthropic => (
            Box::new(AnthropicProvider::new(
                config.anthropic.api_key.as_deref(),
                config.anthropic.base_url.as_deref(),
                config.anthropic.max_tokens,
            )),
            config.anthropic.temperature,
        ),
        BackendKind::Ollama => (
            Box::new(OllamaProvider::new(config.ollama.host.as_deref())),
            OLLAMA_TEMPERATURE,
        ),
    };

    let provider: Box<dyn Provider> = if config.generation.max_retries > 0 {
        Box::new(RetryingProvider::new(
            provider,
            config.generation.max_retries,
            config.generation.base_backoff_ms,
        ))
    } else {
        provider
    };

    tracing::debug!(backend = %kind, model = %model, "generation backend selected");
    Ok(Backend::new(kind, model, temperature, provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn nothing_configured_is_unavailable() {
        assert!(select_backend(&config()).is_err());
        assert!(describe_backend(&config()).is_none());
    }

    #[test]
    fn anthropic_key_wins_over_ollama() {
        let mut config = config();
        config.anthropic.api_key = Some("sk-ant-test".into());
        config.ollama.model = Some("llama3.1".into());

        let backend = select_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Anthropic);
        assert_eq!(backend.model(), config.anthropic.model);
    }

    #[test]
    fn ollama_model_without_key_selects_local() {
        let mut config = config();
        config.ollama.model = Some(" llama3.1 ".into());

        let backend = select_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Ollama);
        assert_eq!(backend.model(), "llama3.1");
    }

    #[test]
    fn blank_key_and_model_are_ignored() {
        let mut config = config();
        config.anthropic.api_key = Some("  ".into());
        config.ollama.model = Some(String::new());
        assert!(select_backend(&config).is_err());
    }

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(BackendKind::Anthropic.to_string(), "anthropic");
        assert_eq!(BackendKind::Ollama.to_string(), "ollama");
    }
}
