use serde::{Deserialize, Serialize};

// ── Anthropic (remote model) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key; `ANTHROPIC_API_KEY` overrides it
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    /// Alternate API base (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".into()
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_anthropic_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl AnthropicConfig {
    pub fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// ── Ollama (local model) ────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server, default http://localhost:11434
    #[serde(default)]
    pub host: Option<String>,
    /// Local model name; unset means no local backend
    #[serde(default)]
    pub model: Option<String>,
}

impl OllamaConfig {
    pub fn is_configured(&self) -> bool {
        self.model.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

// ── Web research ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// "tavily", "serper" or "brave"
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override provider endpoint base (tests)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_research_timeout")]
    pub timeout_secs: u64,
    /// Contexts shorter than this many words become the research query
    #[serde(default = "default_auto_query_max_words")]
    pub auto_query_max_words: usize,
}

fn default_max_results() -> usize {
    5
}

fn default_research_timeout() -> u64 {
    20
}

fn default_auto_query_max_words() -> usize {
    20
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            base_url: None,
            max_results: default_max_results(),
            timeout_secs: default_research_timeout(),
            auto_query_max_words: default_auto_query_max_words(),
        }
    }
}

// ── Grammar check ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// LanguageTool-compatible `/v2/check` endpoint
    #[serde(default = "default_grammar_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_grammar_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_grammar_endpoint() -> String {
    "https://api.languagetool.org/v2/check".into()
}

fn default_language() -> String {
    "en-US".into()
}

fn default_grammar_timeout() -> u64 {
    15
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_grammar_endpoint(),
            language: default_language(),
            timeout_secs: default_grammar_timeout(),
        }
    }
}
