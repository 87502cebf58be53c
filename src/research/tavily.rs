use super::{ResearchProvider, send_json};
use crate::error::ProviderError;
use crate::types::Snippet;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

pub struct TavilySearch {
    client: Client,
    api_key: String,
    search_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl TavilySearch {
    pub fn new(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
        let base = base_url.map_or(DEFAULT_BASE_URL, |u| u.trim_end_matches('/'));
        Self {
            client,
            api_key: api_key.to_string(),
            search_url: format!("{base}/search"),
        }
    }
}

#[async_trait]
impl ResearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError> {
        let body = SearchRequest {
            api_key: &self.api_key,
            query: topic,
            search_depth: "basic",
            max_results,
        };
        let response: SearchResponse = send_json(
            self.name(),
            &self.api_key,
            self.client.post(&self.search_url).json(&body),
        )
        .await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| Snippet {
                title: r.title,
                url: r.url,
                snippet: r
                    .content
                    .filter(|c| !c.is_empty())
                    .or(r.snippet)
                    .unwrap_or_default(),
            })
            .collect())
    }
}
