use crate::providers::http_client::{ANTHROPIC_TIMEOUT_SECS, build_client};
use crate::providers::traits::Provider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: Option<String>,
    messages_url: String,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, max_tokens: u32) -> Self {
        let base = base_url.map_or(DEFAULT_BASE_URL, |u| u.trim_end_matches('/'));
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            messages_url: format!("{base}/v1/messages"),
            max_tokens,
            client: build_client(ANTHROPIC_TIMEOUT_SECS),
        }
    }

    fn extract_text(response: ChatResponse) -> anyhow::Result<String> {
        let text = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            anyhow::bail!("Anthropic returned no text");
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Anthropic API key not set (ANTHROPIC_API_KEY)"))?;

        let request = ChatRequest {
            model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages: [Message {
                role: "user",
                content: message,
            }],
            temperature,
        };

        let response = self
            .client
            .post(&self.messages_url)
            .header("anthropic-version", API_VERSION)
            .header("x-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(super::api_error("Anthropic", response).await);
        }

        let body: ChatResponse = response.json().await.map_err(anyhow::Error::msg)?;
        Self::extract_text(body)
    }
}
