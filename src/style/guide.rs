use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HistoricalPost, Platform};

/// Per-platform length guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRules {
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub target_words: Option<String>,
}

/// Formatting policy applied to every draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePolicy {
    #[serde(default)]
    pub allow_hashtags: bool,
    #[serde(default)]
    pub allow_emoji: bool,
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self {
            allow_hashtags: false,
            allow_emoji: false,
        }
    }
}

/// A short verbatim fragment of a historical post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleFragment {
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub platform: Platform,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub sample_size: usize,
    pub avg_words_per_post: f64,
    pub avg_sentence_words: f64,
    pub question_rate: f64,
    pub emoji_rate: f64,
    pub link_rate: f64,
    pub common_openers: Vec<String>,
    pub common_closers: Vec<String>,
    pub common_phrases: Vec<String>,
}

/// Statistics mined from the ingested corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub analysis_date: NaiveDate,
    pub platforms: BTreeMap<Platform, PlatformStats>,
}

impl DerivedStats {
    pub fn for_platform(&self, platform: Platform) -> Option<&PlatformStats> {
        self.platforms.get(&platform)
    }
}

/// The voice a draft must imitate.
///
/// Persisted as JSON. Only ingestion merges mutate it, and only through
/// [`crate::style::StyleStore`], which enforces the `locked` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleGuide {
    pub version: u64,
    #[serde(default = "default_locked")]
    pub locked: bool,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub tone_rules: Vec<String>,
    #[serde(default)]
    pub lexicon: BTreeSet<String>,
    #[serde(default)]
    pub do_rules: Vec<String>,
    #[serde(default)]
    pub dont_rules: Vec<String>,
    #[serde(default)]
    pub guardrails: Vec<String>,
    #[serde(default)]
    pub formatting: Vec<String>,
    #[serde(default)]
    pub preferred_abbreviations: Vec<String>,
    #[serde(default)]
    pub signature_phrases: Vec<String>,
    #[serde(default)]
    pub policy: StylePolicy,
    #[serde(default)]
    pub platforms: BTreeMap<Platform, PlatformRules>,
    #[serde(default)]
    pub examples: Vec<ExampleFragment>,
    #[serde(default)]
    pub derived: Option<DerivedStats>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_locked() -> bool {
    true
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for StyleGuide {
    fn default() -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            Platform::X,
            PlatformRules {
                max_chars: Some(280),
                target_words: Some("25-45 per post".into()),
            },
        );
        platforms.insert(
            Platform::Linkedin,
            PlatformRules {
                max_chars: Some(3000),
                target_words: Some("120-250".into()),
            },
        );

        Self {
            version: 1,
            locked: true,
            persona: "a founder-CEO who writes plainly about running the business".into(),
            tone_rules: strings(&["clear", "practical", "data-backed", "candid", "humble"]),
            lexicon: BTreeSet::new(),
            do_rules: strings(&[
                "Lead with the point in the first line",
                "Explain the why behind a decision in plain words",
                "Credit the team and customers",
                "Acknowledge trade-offs and what could go wrong",
            ]),
            dont_rules: strings(&[
                "No hype, superlatives or marketing speak",
                "No investment advice or predictions about markets",
                "No attacks on individuals or competitors",
            ]),
            guardrails: strings(&[
                "No investment advice or return expectations",
                "Do not speculate about what regulators intend",
                "Stay within what the company has said in public",
            ]),
            formatting: strings(&[
                "Short sentences and short paragraphs",
                "Plain text, no markdown headings",
            ]),
            preferred_abbreviations: strings(&["FY", "YoY", "MF"]),
            signature_phrases: Vec::new(),
            policy: StylePolicy::default(),
            platforms,
            examples: Vec::new(),
            derived: None,
            updated_at: None,
        }
    }
}

impl StyleGuide {
    /// Character ceiling for a single post on `platform`.
    pub fn max_chars(&self, platform: Platform) -> usize {
        self.platforms
            .get(&platform)
            .and_then(|r| r.max_chars)
            .unwrap_or_else(|| platform.default_max_chars())
    }

    pub fn target_words(&self, platform: Platform) -> Option<&str> {
        self.platforms
            .get(&platform)
            .and_then(|r| r.target_words.as_deref())
    }

    /// Fold freshly ingested posts and recomputed statistics into the guide.
    ///
    /// Lexicon grows by the derived common phrases, examples keep the newest
    /// `max_examples` distinct fragments, and the version is bumped.
    pub fn merge(
        &mut self,
        posts: &[HistoricalPost],
        derived: DerivedStats,
        max_examples: usize,
        now: DateTime<Utc>,
    ) {
        for stats in derived.platforms.values() {
            self.lexicon
                .extend(stats.common_phrases.iter().cloned());
        }
        self.derived = Some(derived);

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut examples: Vec<ExampleFragment> = posts
            .iter()
            .map(|post| ExampleFragment {
                text: post.text.clone(),
                timestamp: post.timestamp,
                platform: post.platform,
            })
            .chain(self.examples.drain(..))
            .filter(|fragment| seen.insert(fragment.text.to_lowercase()))
            .collect();
        // Newest first; undated fragments sink to the end, stable otherwise.
        examples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        examples.truncate(max_examples);
        self.examples = examples;

        self.version += 1;
        self.updated_at = Some(now);
    }
}
