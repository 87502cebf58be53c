use reqwest::Client;
use std::time::Duration;

/// Remote model calls can take a while on long drafts.
pub const ANTHROPIC_TIMEOUT_SECS: u64 = 120;
/// Local models on modest hardware are slower still.
pub const OLLAMA_TIMEOUT_SECS: u64 = 300;

/// Shared client shape for every outbound service: bounded total and connect
/// timeouts plus a small keep-alive pool.
pub fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("ghostpost/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default http client");
            Client::new()
        })
}
