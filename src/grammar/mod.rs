//! Advisory grammar checking. Suggestions are attached to drafts and never
//! applied; any failure becomes a warning.

pub mod languagetool;

use crate::config::GrammarConfig;
use crate::error::ProviderError;
use crate::types::GrammarSuggestion;
use async_trait::async_trait;

pub use languagetool::LanguageToolChecker;

#[async_trait]
pub trait GrammarChecker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, text: &str) -> Result<Vec<GrammarSuggestion>, ProviderError>;
}

/// `None` when grammar checking is switched off.
pub fn create_grammar_checker(config: &GrammarConfig) -> Option<Box<dyn GrammarChecker>> {
    if !config.enabled {
        return None;
    }
    Some(Box::new(LanguageToolChecker::new(
        &config.endpoint,
        &config.language,
        config.timeout_secs,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_has_no_checker() {
        let config = GrammarConfig {
            enabled: false,
            ..GrammarConfig::default()
        };
        assert!(create_grammar_checker(&config).is_none());
        assert_eq!(
            create_grammar_checker(&GrammarConfig::default()).unwrap().name(),
            "languagetool"
        );
    }
}
