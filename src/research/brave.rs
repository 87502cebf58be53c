use super::{ResearchProvider, send_json};
use crate::error::ProviderError;
use crate::types::Snippet;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";
/// Brave rejects web searches asking for more than this many results.
const MAX_COUNT: usize = 20;

pub struct BraveSearch {
    client: Client,
    api_key: String,
    search_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

impl BraveSearch {
    pub fn new(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
        let base = base_url.map_or(DEFAULT_BASE_URL, |u| u.trim_end_matches('/'));
        Self {
            client,
            api_key: api_key.to_string(),
            search_url: format!("{base}/res/v1/web/search"),
        }
    }
}

#[async_trait]
impl ResearchProvider for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError> {
        let count = max_results.clamp(1, MAX_COUNT).to_string();
        let request = self
            .client
            .get(&self.search_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", topic), ("count", count.as_str())]);
        let response: SearchResponse = send_json(self.name(), &self.api_key, request).await?;

        Ok(response
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| Snippet {
                title: r.title,
                url: r.url,
                snippet: r.description,
            })
            .collect())
    }
}
