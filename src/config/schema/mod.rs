mod core;
mod gateway;
mod generation;
mod services;

pub use core::Config;
pub use gateway::GatewayConfig;
pub use generation::{GenerationConfig, IngestConfig};
pub use services::{AnthropicConfig, GrammarConfig, OllamaConfig, ResearchConfig};
