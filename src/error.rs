use thiserror::Error;

use crate::pipeline::Stage;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `ghostpost`.
///
/// Ingestion and generation failures are fatal to the invoking command.
/// `ProviderError` is the non-fatal family: callers in the research and
/// grammar paths convert it into a warning instead of propagating it.
#[derive(Debug, Error)]
pub enum GhostpostError {
    // ── Ingestion ───────────────────────────────────────────────────────
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    // ── Style store ─────────────────────────────────────────────────────
    #[error(transparent)]
    Locked(#[from] LockedStoreError),

    #[error("style store: {0}")]
    Store(#[from] StoreError),

    // ── External services (research / grammar) ──────────────────────────
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    // ── Generation ──────────────────────────────────────────────────────
    #[error(transparent)]
    Unavailable(#[from] GenerationUnavailable),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Ingestion errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("no extractable posts found in {path}")]
    NoPosts { path: String },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),
}

// ─── Style store errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("style guide v{version} is locked; re-run with --force-update-style to override")]
pub struct LockedStoreError {
    pub version: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("corrupt style guide {path}: {message}")]
    Corrupt { path: String, message: String },
}

// ─── Research / grammar provider errors ─────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} authentication failed")]
    Auth { provider: String },

    #[error("{provider} timed out")]
    Timeout { provider: String },

    #[error("{provider} returned an unreadable response: {message}")]
    Decode { provider: String, message: String },
}

impl ProviderError {
    /// Classify a `reqwest` failure for the named provider.
    pub fn from_reqwest(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                provider: provider.to_string(),
            };
        }
        if let Some(status) = err.status()
            && (status.as_u16() == 401 || status.as_u16() == 403)
        {
            return Self::Auth {
                provider: provider.to_string(),
            };
        }
        if err.is_decode() {
            return Self::Decode {
                provider: provider.to_string(),
                message: err.to_string(),
            };
        }
        Self::Request {
            provider: provider.to_string(),
            message: crate::providers::sanitize_api_error(&err.to_string()),
        }
    }
}

// ─── Generation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error(
    "no generation backend available: set ANTHROPIC_API_KEY for the remote model or OLLAMA_MODEL for a local one"
)]
pub struct GenerationUnavailable;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("thread segment {index} is {length} chars (limit {limit})")]
    SegmentTooLong {
        index: usize,
        length: usize,
        limit: usize,
    },

    #[error("unsupported platform '{0}' (expected x or linkedin)")]
    Platform(String),

    #[error("draft is empty")]
    EmptyDraft,

    #[error("{0}")]
    Refused(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Pipeline failure ────────────────────────────────────────────────────────

/// A fatal pipeline error together with the stage it interrupted.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: GhostpostError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<GhostpostError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.source, GhostpostError::Unavailable(_))
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GhostpostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_store_error_mentions_override_flag() {
        let err = GhostpostError::Locked(LockedStoreError { version: 4 });
        let text = err.to_string();
        assert!(text.contains("v4"));
        assert!(text.contains("--force-update-style"));
    }

    #[test]
    fn segment_error_displays_lengths() {
        let err = ValidationError::SegmentTooLong {
            index: 2,
            length: 301,
            limit: 280,
        };
        assert_eq!(err.to_string(), "thread segment 2 is 301 chars (limit 280)");
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: GhostpostError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }

    #[test]
    fn pipeline_error_keeps_stage_and_message() {
        let err = PipelineError::new(Stage::Generating, GenerationUnavailable);
        assert_eq!(err.stage, Stage::Generating);
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn parse_error_names_the_document() {
        let err = GhostpostError::Parse(ParseError::NoPosts {
            path: "activity.pdf".into(),
        });
        assert!(err.to_string().contains("activity.pdf"));
    }
}
