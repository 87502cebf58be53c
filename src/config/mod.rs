pub mod schema;

pub use schema::{
    AnthropicConfig, Config, GatewayConfig, GenerationConfig, GrammarConfig, IngestConfig,
    OllamaConfig, ResearchConfig,
};
