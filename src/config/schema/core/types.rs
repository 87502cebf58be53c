use super::super::{
    AnthropicConfig, GatewayConfig, GenerationConfig, GrammarConfig, IngestConfig, OllamaConfig,
    ResearchConfig,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Directory holding the style guide and corpus (`~` is expanded)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub grammar: GrammarConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_data_dir() -> String {
    "~/.ghostpost/data".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            data_dir: default_data_dir(),
            anthropic: AnthropicConfig::default(),
            ollama: OllamaConfig::default(),
            research: ResearchConfig::default(),
            grammar: GrammarConfig::default(),
            generation: GenerationConfig::default(),
            ingest: IngestConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    /// Data directory with `~` and `$VARS` expanded.
    pub fn data_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.data_dir);
        PathBuf::from(expanded.as_ref())
    }

    pub fn style_guide_path(&self) -> PathBuf {
        self.data_dir().join("style_guide.json")
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir().join("corpus.jsonl")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.anthropic.temperature) {
            return Err(ConfigError::Validation(format!(
                "anthropic.temperature must be within 0.0..=1.0, got {}",
                self.anthropic.temperature
            )));
        }
        if !(1..=20).contains(&self.research.max_results) {
            return Err(ConfigError::Validation(format!(
                "research.max_results must be within 1..=20, got {}",
                self.research.max_results
            )));
        }
        if self.gateway.port == 0 {
            return Err(ConfigError::Validation("gateway.port must be non-zero".into()));
        }
        if url::Url::parse(&self.grammar.endpoint).is_err() {
            return Err(ConfigError::Validation(format!(
                "grammar.endpoint is not a valid URL: {}",
                self.grammar.endpoint
            )));
        }
        Ok(())
    }
}
