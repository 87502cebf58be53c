use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// Target social platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    #[strum(to_string = "x", serialize = "twitter")]
    X,
    #[strum(to_string = "linkedin")]
    Linkedin,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::X, Platform::Linkedin];

    /// Single-post character ceiling used when neither the request nor the
    /// style guide overrides it.
    pub fn default_max_chars(self) -> usize {
        match self {
            Platform::X => 280,
            Platform::Linkedin => 3000,
        }
    }

    pub fn supports_threads(self) -> bool {
        matches!(self, Platform::X)
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::X => "X",
            Platform::Linkedin => "LinkedIn",
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Platform::from_str(value.trim()).map_err(|_| ValidationError::Platform(value))
    }
}

/// A post pulled out of an exported history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPost {
    pub id: String,
    pub platform: Platform,
    pub text: String,
    #[serde(rename = "created_at")]
    pub timestamp: Option<DateTime<Utc>>,
    pub source: String,
}

impl HistoricalPost {
    pub fn new(
        platform: Platform,
        text: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
        source: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: crate::utils::text::content_id(platform, &text),
            platform,
            text,
            timestamp,
            source: source.into(),
        }
    }
}

/// Research behaviour for a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchOptions {
    #[serde(default = "default_true")]
    pub allow: bool,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_true")]
    pub auto: bool,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            allow: true,
            query: None,
            auto: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_variants() -> usize {
    1
}

/// Everything the user supplied for one draft run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub platform: Platform,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub angle: Option<String>,
    #[serde(default, alias = "cta")]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub thread: bool,
    #[serde(default = "default_variants")]
    pub variants: usize,
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub research: ResearchOptions,
    #[serde(default = "default_true")]
    pub proofread: bool,
}

impl GenerationRequest {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            context: String::new(),
            facts: Vec::new(),
            angle: None,
            call_to_action: None,
            thread: false,
            variants: default_variants(),
            max_chars: None,
            research: ResearchOptions::default(),
            proofread: true,
        }
    }

    /// Trim inputs, drop blank facts, clamp variants and switch threading off
    /// for platforms that have no threads.
    pub fn normalized(mut self) -> Self {
        self.context = self.context.trim().to_string();
        self.facts = self
            .facts
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        self.angle = self
            .angle
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self.call_to_action = self
            .call_to_action
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.research.query = self
            .research
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self.variants = self.variants.clamp(1, 5);
        if !self.platform.supports_threads() {
            self.thread = false;
        }
        self
    }
}

/// Advisory suggestion returned by the grammar service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarSuggestion {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub excerpt: String,
    pub replacements: Vec<String>,
}

/// A post-processed draft ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub body: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread_segments: Vec<String>,
    #[serde(default)]
    pub placeholders: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grammar_suggestions: Vec<GrammarSuggestion>,
}

impl Draft {
    pub fn is_threaded(&self) -> bool {
        !self.thread_segments.is_empty()
    }

    /// Text as it would be posted: threads get `k/N` labels, one per line.
    pub fn render(&self) -> String {
        if !self.is_threaded() {
            return self.body.clone();
        }
        let total = self.thread_segments.len();
        self.thread_segments
            .iter()
            .enumerate()
            .map(|(i, segment)| format!("{}/{total} {segment}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Research source attached to the outcome metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Research gathered for one request. Empty when research was skipped or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    pub query: Option<String>,
    pub snippets: Vec<Snippet>,
    pub summary: Option<String>,
}

impl ResearchContext {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMetadata {
    pub backend: String,
    pub model: Option<String>,
    pub llm: bool,
    pub research_used: bool,
    pub research_query: Option<String>,
    pub research_summary: Option<String>,
    pub sources: Vec<Snippet>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub request_id: String,
    pub platform: Platform,
    pub thread: bool,
    pub drafts: Vec<Draft>,
    pub warnings: Vec<String>,
    pub metadata: OutcomeMetadata,
}

impl GenerationOutcome {
    /// All drafts rendered and separated the way variants are requested.
    pub fn render_text(&self) -> String {
        self.drafts
            .iter()
            .map(Draft::render)
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}
