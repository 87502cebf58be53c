use super::{ResearchProvider, send_json};
use crate::error::ProviderError;
use crate::types::Snippet;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

pub struct SerperSearch {
    client: Client,
    api_key: String,
    search_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperSearch {
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
impl ResearchProvider for SerperSearch {
    fn name(&self) -> &str {
        "serper"
    }

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError> {
        let request = self
            .client
            .post(&self.search_url)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchRequest {
                q: topic,
                num: max_results,
            });
        let response: SearchResponse = send_json(self.name(), &self.api_key, request).await?;

        Ok(response
            .organic
            .into_iter()
            .map(|r| Snippet {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
            })
            .collect())
    }
}
