mod support;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ghostpost::providers::Provider;
use ghostpost::providers::anthropic::AnthropicProvider;
use ghostpost::providers::ollama::OllamaProvider;
use ghostpost::providers::reliable::RetryingProvider;
use support::{anthropic_reply, ollama_reply};

#[tokio::test]
async fn anthropic_sends_system_prompt_and_key_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "system": "Write like me.",
            "max_tokens": 400,
            "messages": [{"role": "user", "content": "Draft a post"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("Shipped it.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new(Some("sk-ant-test-key"), Some(&server.uri()), 400);
    let text = provider
        .chat_with_system(Some("Write like me."), "Draft a post", "claude-test", 0.7)
        .await
        .unwrap();

    assert_eq!(text, "Shipped it.");
    server.verify().await;
}

#[tokio::test]
async fn anthropic_error_body_is_scrubbed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error":{"type":"authentication_error","message":"invalid key sk-ant-live-abcdef123456"}}"#,
        ))
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new(Some("sk-ant-live-abcdef123456"), Some(&server.uri()), 400);
    let err = provider
        .chat_with_system(None, "hi", "claude-test", 0.7)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("401"));
    assert!(err.contains("authentication_error"));
    assert!(!err.contains("abcdef123456"));
}

#[tokio::test]
async fn ollama_posts_non_streaming_chat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "stream": false,
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_reply("local draft")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(Some(&server.uri()));
    let text = provider
        .chat_with_system(Some("sys"), "hello", "llama3", 0.7)
        .await
        .unwrap();

    assert_eq!(text, "local draft");
    server.verify().await;
}

#[tokio::test]
async fn ollama_failure_mentions_the_local_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama3' not found"))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(Some(&server.uri()));
    let err = provider
        .chat_with_system(None, "hello", "llama3", 0.7)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("not found"));
    assert!(err.contains("ollama serve"));
}

#[tokio::test]
async fn retrying_provider_recovers_from_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_reply("second time")))
        .with_priority(2)
        .mount(&server)
        .await;

    let provider = RetryingProvider::new(Box::new(OllamaProvider::new(Some(&server.uri()))), 2, 1);
    let text = provider.chat("hello", "llama3", 0.7).await.unwrap();

    assert_eq!(text, "second time");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn retrying_provider_gives_up_on_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let inner = AnthropicProvider::new(Some("sk-ant-test-key"), Some(&server.uri()), 400);
    let provider = RetryingProvider::new(Box::new(inner), 3, 1);
    assert!(provider.chat("hello", "claude-test", 0.7).await.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
