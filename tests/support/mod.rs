#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use ghostpost::config::Config;
use ghostpost::style::StyleStore;

/// Config with every outbound service switched off and data under `dir`.
pub fn offline_config(dir: &Path) -> Config {
    let mut config = Config {
        data_dir: dir.display().to_string(),
        config_path: dir.join("config.toml"),
        ..Config::default()
    };
    config.anthropic.api_key = None;
    config.ollama.model = None;
    config.research.provider = None;
    config.research.api_key = None;
    config.grammar.enabled = false;
    config
}

pub fn open_store(config: &Config) -> Arc<StyleStore> {
    Arc::new(StyleStore::open(config.style_guide_path()).expect("style store should open"))
}

/// Anthropic messages API response carrying `text`.
pub fn anthropic_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

/// Ollama `/api/chat` response carrying `text`.
pub fn ollama_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "llama3",
        "message": {"role": "assistant", "content": text},
        "done": true
    })
}
