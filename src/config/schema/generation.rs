use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Render the structured template when no backend is configured
    #[serde(default = "default_true")]
    pub template_fallback: bool,
    /// Extra attempts after the first failed LLM call (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Replace numbers not backed by supplied input with placeholders
    #[serde(default = "default_true")]
    pub strict_numbers: bool,
    /// Summarise research snippets with the LLM before drafting
    #[serde(default = "default_true")]
    pub summarize_research: bool,
}

fn default_true() -> bool {
    true
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            template_fallback: true,
            max_retries: 0,
            base_backoff_ms: default_backoff_ms(),
            strict_numbers: true,
            summarize_research: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Display name heading each post in a LinkedIn activity export
    #[serde(default = "default_author_name")]
    pub author_name: String,
    /// Handle heading each post in a Nitter profile export
    #[serde(default = "default_author_handle")]
    pub author_handle: String,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    /// Example fragments retained in the style guide
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
}

fn default_author_name() -> String {
    "Nithin Kamath".into()
}

fn default_author_handle() -> String {
    "@Nithin0dha".into()
}

fn default_min_words() -> usize {
    3
}

fn default_max_examples() -> usize {
    20
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_handle: default_author_handle(),
            min_words: default_min_words(),
            max_examples: default_max_examples(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults_are_single_attempt_with_fallback() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_retries, 0);
        assert!(config.template_fallback);
        assert!(config.strict_numbers);
    }

    #[test]
    fn ingest_toml_overrides_author() {
        let config: IngestConfig =
            toml::from_str("author_name = \"Jane Doe\"\nauthor_handle = \"@jane\"").unwrap();
        assert_eq!(config.author_name, "Jane Doe");
        assert_eq!(config.author_handle, "@jane");
        assert_eq!(config.min_words, 3);
    }
}
