use crate::providers::http_client::{OLLAMA_TIMEOUT_SECS, build_client};
use crate::providers::traits::Provider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_HOST)
                .trim_end_matches('/')
                .to_string(),
            client: build_client(OLLAMA_TIMEOUT_SECS),
        }
    }

    fn build_request<'a>(
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys,
            });
        }
        messages.push(Message {
            role: "user",
            content: message,
        });

        ChatRequest {
            model,
            messages,
            stream: false,
            options: Options { temperature },
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = Self::build_request(system_prompt, message, model, temperature);
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let err = super::api_error("Ollama", response).await;
            anyhow::bail!("{err}. Is `ollama serve` running and the model pulled?");
        }

        let body: ChatResponse = response.json().await.map_err(anyhow::Error::msg)?;
        if body.message.content.trim().is_empty() {
            anyhow::bail!("Ollama returned no text");
        }
        Ok(body.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let p = OllamaProvider::new(None);
        assert_eq!(p.base_url, "http://localhost:11434");
    }

    #[test]
    fn custom_url_trailing_slash() {
        let p = OllamaProvider::new(Some("http://192.168.1.100:11434/"));
        assert_eq!(p.base_url, "http://192.168.1.100:11434");
    }

    #[test]
    fn request_puts_system_first() {
        let req = OllamaProvider::build_request(Some("voice rules"), "draft it", "llama3.1", 0.7);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "draft it");
        assert_eq!(json["options"]["temperature"], 0.7);
    }

    #[test]
    fn request_without_system_has_single_message() {
        let req = OllamaProvider::build_request(None, "test", "mistral", 0.0);
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn response_deserializes() {
        let json = r#"{"model":"llama3.1","message":{"role":"assistant","content":"line1\nline2"},"done":true}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(resp.message.content.contains("line2"));
    }
}
