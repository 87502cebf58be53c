use super::GrammarChecker;
use crate::error::ProviderError;
use crate::providers::http_client::build_client;
use crate::types::GrammarSuggestion;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const NAME: &str = "languagetool";
const MAX_SUGGESTIONS: usize = 20;
const MAX_REPLACEMENTS: usize = 3;

pub struct LanguageToolChecker {
    client: Client,
    endpoint: String,
    language: String,
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
}

#[derive(Deserialize)]
struct Replacement {
    value: String,
}

/// LanguageTool offsets count UTF-16 code units.
fn utf16_excerpt(units: &[u16], offset: usize, length: usize) -> String {
    let start = offset.min(units.len());
    let end = offset.saturating_add(length).min(units.len());
    String::from_utf16_lossy(&units[start..end])
}

impl LanguageToolChecker {
    pub fn new(endpoint: &str, language: &str, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            endpoint: endpoint.to_string(),
            language: language.to_string(),
        }
    }

    fn to_suggestions(text: &str, response: CheckResponse) -> Vec<GrammarSuggestion> {
        let units: Vec<u16> = text.encode_utf16().collect();
        response
            .matches
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|m| GrammarSuggestion {
                excerpt: utf16_excerpt(&units, m.offset, m.length),
                message: m.message,
                offset: m.offset,
                length: m.length,
                replacements: m
                    .replacements
                    .into_iter()
                    .take(MAX_REPLACEMENTS)
                    .map(|r| r.value)
                    .collect(),
            })
            .collect()
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    fn name(&self) -> &str {
        NAME
    }

    async fn check(&self, text: &str) -> Result<Vec<GrammarSuggestion>, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request {
                provider: NAME.into(),
                message: format!(
                    "HTTP {status}: {}",
                    crate::providers::sanitize_api_error(&body)
                ),
            });
        }

        let parsed: CheckResponse = response.json().await.map_err(|e| ProviderError::Decode {
            provider: NAME.into(),
            message: e.to_string(),
        })?;
        Ok(Self::to_suggestions(text, parsed))
    }
}
