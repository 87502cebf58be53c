//! Web research used to ground drafts in current sources.
//!
//! Every failure here is soft: the caller gets an empty [`ResearchContext`]
//! and a warning string, never an error.

pub mod brave;
pub mod serper;
pub mod tavily;

use crate::config::ResearchConfig;
use crate::error::ProviderError;
use crate::providers::http_client::build_client;
use crate::providers::scrub_secrets;
use crate::types::{GenerationRequest, ResearchContext, Snippet};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use strum::{Display, EnumString};

pub use brave::BraveSearch;
pub use serper::SerperSearch;
pub use tavily::TavilySearch;

/// A search API that turns a topic into attributed snippets.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResearchKind {
    Tavily,
    Serper,
    Brave,
}

/// Build the configured provider; `None` when provider or key is missing.
pub fn create_research_provider(config: &ResearchConfig) -> Option<Box<dyn ResearchProvider>> {
    let name = config.provider.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
    let key = config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;

    let Ok(kind) = ResearchKind::from_str(name) else {
        tracing::warn!(provider = name, "unknown research provider; research disabled");
        return None;
    };

    let client = build_client(config.timeout_secs);
    let base_url = config.base_url.as_deref();
    let provider: Box<dyn ResearchProvider> = match kind {
        ResearchKind::Tavily => Box::new(TavilySearch::new(client, key, base_url)),
        ResearchKind::Serper => Box::new(SerperSearch::new(client, key, base_url)),
        ResearchKind::Brave => Box::new(BraveSearch::new(client, key, base_url)),
    };
    Some(provider)
}

/// Explicit query wins; otherwise a short context doubles as the query.
pub fn pick_query(request: &GenerationRequest, auto_query_max_words: usize) -> Option<String> {
    if let Some(query) = request.research.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        return Some(query.to_string());
    }
    if !request.research.auto {
        return None;
    }
    let context = request.context.trim();
    let words = context.split_whitespace().count();
    (words > 0 && words < auto_query_max_words).then(|| context.to_string())
}

/// Run research for a request, converting every failure into a warning.
pub async fn gather(
    provider: Option<&dyn ResearchProvider>,
    request: &GenerationRequest,
    config: &ResearchConfig,
) -> (ResearchContext, Vec<String>) {
    let mut warnings = Vec::new();
    if !request.research.allow {
        return (ResearchContext::default(), warnings);
    }

    let Some(provider) = provider else {
        warnings.push("Research requested but no search provider or API key is configured".into());
        return (ResearchContext::default(), warnings);
    };

    let Some(query) = pick_query(request, config.auto_query_max_words) else {
        warnings.push("Research skipped (context is long and no query was provided)".into());
        return (ResearchContext::default(), warnings);
    };

    let snippets = match provider.fetch(&query, config.max_results).await {
        Ok(snippets) => snippets,
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "research failed");
            warnings.push(format!("Research unavailable: {e}"));
            Vec::new()
        }
    };

    let snippets: Vec<Snippet> = snippets
        .into_iter()
        .filter(|s| !s.snippet.trim().is_empty() || !s.title.trim().is_empty())
        .take(config.max_results)
        .collect();

    if snippets.is_empty() && warnings.is_empty() {
        warnings.push("Research returned no results".into());
    }
    tracing::debug!(provider = provider.name(), query = %query, count = snippets.len(), "research complete");

    (
        ResearchContext {
            query: Some(query),
            snippets,
            summary: None,
        },
        warnings,
    )
}

/// Send a search request and decode its JSON body, classifying failures.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    api_key: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;

    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(ProviderError::Auth {
            provider: provider.to_string(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let scrubbed = scrub_secrets(&body, &[api_key]);
        return Err(ProviderError::Request {
            provider: provider.to_string(),
            message: format!(
                "HTTP {status}: {}",
                crate::providers::sanitize_api_error(&scrubbed)
            ),
        });
    }

    response.json::<T>().await.map_err(|e| ProviderError::Decode {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}
