use super::traits::Provider;
use async_trait::async_trait;
use std::time::Duration;

const MAX_BACKOFF_MS: u64 = 10_000;

/// Client errors will not resolve by retrying, except 408 and 429.
fn is_non_retryable(err: &anyhow::Error) -> bool {
    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
        if let Some(status) = reqwest_err.status() {
            let code = status.as_u16();
            return status.is_client_error() && code != 429 && code != 408;
        }
        return false;
    }
    // Non-success responses surface as "<Provider> API error (<status>)".
    let msg = err.to_string();
    if let Some(rest) = msg.split("API error (").nth(1)
        && let Some(code) = rest
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|w| w.parse::<u16>().ok())
    {
        return (400..500).contains(&code) && code != 429 && code != 408;
    }
    false
}

/// Retries a single provider with exponential backoff. There is no fallback
/// to another provider: when the attempts run out the last error is returned.
pub struct RetryingProvider {
    inner: Box<dyn Provider>,
    max_retries: u32,
    base_backoff_ms: u64,
}

impl RetryingProvider {
    pub fn new(inner: Box<dyn Provider>, max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff_ms: base_backoff_ms.max(50),
        }
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let mut backoff_ms = self.base_backoff_ms;
        let mut attempt = 0;

        loop {
            match self
                .inner
                .chat_with_system(system_prompt, message, model, temperature)
                .await
            {
                Ok(text) => {
                    if attempt > 0 {
                        tracing::info!(provider = self.name(), attempt, "provider recovered after retries");
                    }
                    return Ok(text);
                }
                Err(e) if attempt < self.max_retries && !is_non_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        provider = self.name(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
