//! One draft request from inputs to validated drafts.
//!
//! `Composing -> Generating -> PostProcessing -> Done`, with `Failed`
//! reachable from every stage. Research and grammar degrade to warnings;
//! composition, generation and validation failures are fatal.

use std::sync::Arc;

use strum::Display;
use uuid::Uuid;

use crate::config::{Config, GenerationConfig, ResearchConfig};
use crate::error::{GenerationUnavailable, PipelineError};
use crate::grammar::{GrammarChecker, create_grammar_checker};
use crate::postprocess::{PostProcessOptions, process};
use crate::prompt::{build_proofread_prompt, build_summary_prompt, compose, effective_max_chars};
use crate::providers::{Backend, render_template, select_backend};
use crate::research::{ResearchProvider, create_research_provider, gather};
use crate::style::StyleStore;
use crate::types::{GenerationOutcome, GenerationRequest, OutcomeMetadata, ResearchContext};
use crate::utils::text::char_len;

/// A proofread may grow the draft by at most 6/5.
const PROOFREAD_GROWTH: (usize, usize) = (6, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Composing,
    Generating,
    PostProcessing,
    Done,
    Failed,
}

pub struct GenerationPipeline {
    store: Arc<StyleStore>,
    backend: Option<Backend>,
    research: Option<Box<dyn ResearchProvider>>,
    grammar: Option<Box<dyn GrammarChecker>>,
    generation: GenerationConfig,
    research_config: ResearchConfig,
}

fn transition(request_id: &str, stage: Stage) {
    tracing::info!(request_id, stage = %stage, "pipeline stage");
}

impl GenerationPipeline {
    /// Pipeline with no backend, research or grammar attached.
    pub fn new(
        store: Arc<StyleStore>,
        generation: GenerationConfig,
        research_config: ResearchConfig,
    ) -> Self {
        Self {
            store,
            backend: None,
            research: None,
            grammar: None,
            generation,
            research_config,
        }
    }

    /// Wire everything the configuration asks for. A missing backend is not an
    /// error here; it surfaces when a request is run.
    pub fn from_config(config: &Config, store: Arc<StyleStore>) -> Self {
        let mut pipeline = Self::new(store, config.generation.clone(), config.research.clone());
        pipeline.backend = select_backend(config).ok();
        pipeline.research = create_research_provider(&config.research);
        pipeline.grammar = create_grammar_checker(&config.grammar);
        pipeline
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_research(mut self, research: Box<dyn ResearchProvider>) -> Self {
        self.research = Some(research);
        self
    }

    #[must_use]
    pub fn with_grammar(mut self, grammar: Box<dyn GrammarChecker>) -> Self {
        self.grammar = Some(grammar);
        self
    }

    /// `--strict`: fail with `GenerationUnavailable` instead of templating.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        if strict {
            self.generation.template_fallback = false;
        }
        self
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_ref()
    }

    pub fn store(&self) -> &StyleStore {
        &self.store
    }

    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationOutcome, PipelineError> {
        let request_id = Uuid::new_v4().to_string();
        let result = self.run_stages(&request_id, request.normalized()).await;
        match &result {
            Ok(outcome) => {
                transition(&request_id, Stage::Done);
                tracing::info!(
                    request_id = %request_id,
                    drafts = outcome.drafts.len(),
                    warnings = outcome.warnings.len(),
                    backend = %outcome.metadata.backend,
                    "generation complete"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    stage = %Stage::Failed,
                    failed_at = %e.stage,
                    error = %e,
                    "generation failed"
                );
            }
        }
        result
    }

    async fn run_stages(
        &self,
        request_id: &str,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, PipelineError> {
        let mut warnings = Vec::new();

        // ── Composing ───────────────────────────────────────────────
        transition(request_id, Stage::Composing);
        let guide = self.store.snapshot();
        let (mut research, research_warnings) =
            gather(self.research.as_deref(), &request, &self.research_config).await;
        warnings.extend(research_warnings);
        if !research.is_empty() {
            research.summary = self.summarize(&request, &research, &mut warnings).await;
        }
        let prompt = compose(&guide, &request, &research)
            .map_err(|e| PipelineError::new(Stage::Composing, e))?;
        let limit = effective_max_chars(&guide, &request);

        // ── Generating ──────────────────────────────────────────────
        transition(request_id, Stage::Generating);
        let raw = match &self.backend {
            Some(backend) => {
                let draft = backend
                    .generate(&prompt)
                    .await
                    .map_err(|e| PipelineError::new(Stage::Generating, e))?;
                if request.proofread {
                    self.proofread(backend, &request, draft, &mut warnings).await
                } else {
                    draft
                }
            }
            None if self.generation.template_fallback => {
                warnings.push(
                    "No generation backend configured; returned a structured draft template."
                        .into(),
                );
                render_template(&request)
            }
            None => return Err(PipelineError::new(Stage::Generating, GenerationUnavailable)),
        };

        // ── Post-processing ─────────────────────────────────────────
        transition(request_id, Stage::PostProcessing);
        let options = PostProcessOptions {
            limit,
            strict_numbers: self.generation.strict_numbers,
            allow_hashtags: guide.policy.allow_hashtags,
            allow_emoji: guide.policy.allow_emoji,
        };
        let processed = process(&raw, &request, &research, &options)
            .map_err(|e| PipelineError::new(Stage::PostProcessing, e))?;
        warnings.extend(processed.warnings);

        let mut drafts = processed.drafts;
        if let Some(grammar) = &self.grammar {
            for draft in &mut drafts {
                match grammar.check(&draft.render()).await {
                    Ok(suggestions) => draft.grammar_suggestions = suggestions,
                    Err(e) => {
                        tracing::warn!(request_id, checker = grammar.name(), error = %e, "grammar check failed");
                        warnings.push(format!("Grammar check unavailable: {e}"));
                        break;
                    }
                }
            }
        }

        let metadata = OutcomeMetadata {
            backend: self
                .backend
                .as_ref()
                .map_or_else(|| "template".to_string(), |b| b.kind().to_string()),
            model: self.backend.as_ref().map(|b| b.model().to_string()),
            llm: self.backend.is_some(),
            research_used: !research.is_empty(),
            research_query: research.query.clone(),
            research_summary: research.summary.clone(),
            sources: research.snippets.clone(),
        };

        Ok(GenerationOutcome {
            request_id: request_id.to_string(),
            platform: request.platform,
            thread: request.thread,
            drafts,
            warnings,
            metadata,
        })
    }

    /// Condense snippets into bullets. Best effort.
    async fn summarize(
        &self,
        request: &GenerationRequest,
        research: &ResearchContext,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        let backend = self.backend.as_ref()?;
        if !self.generation.summarize_research {
            return None;
        }
        let prompt = build_summary_prompt(&request.context, &research.snippets).ok()?;
        match backend.edit(&prompt).await {
            Ok(summary) if !summary.is_empty() => Some(summary),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "research summary failed");
                warnings.push("Research summary failed; using raw snippets".into());
                None
            }
        }
    }

    /// Surface-level edit of a generated draft. Keeps the original on failure
    /// or when the edit grows the text too much.
    async fn proofread(
        &self,
        backend: &Backend,
        request: &GenerationRequest,
        draft: String,
        warnings: &mut Vec<String>,
    ) -> String {
        let edited = match build_proofread_prompt(request.platform, &draft) {
            Ok(prompt) => backend.edit(&prompt).await,
            Err(e) => Err(e),
        };
        match edited {
            Ok(text) if text.is_empty() => {
                warnings.push("Proofread step returned nothing; kept the original draft".into());
                draft
            }
            Ok(text)
                if char_len(&text) * PROOFREAD_GROWTH.1 > char_len(&draft) * PROOFREAD_GROWTH.0 =>
            {
                warnings.push("Proofread step expanded the draft; kept the original".into());
                draft
            }
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "proofread failed");
                warnings.push("Proofread step failed; kept the original draft".into());
                draft
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GhostpostError, ProviderError};
    use crate::providers::{BackendKind, Provider};
    use crate::types::{GrammarSuggestion, Platform, Snippet};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies from a script, one entry per call, and records each prompt.
    struct Scripted {
        replies: Mutex<Vec<anyhow::Result<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Provider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat_with_system(
            &self,
            system_prompt: Option<&str>,
            message: &str,
            _model: &str,
            _temperature: f64,
        ) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push(format!("{}\n{message}", system_prompt.unwrap_or_default()));
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                anyhow::bail!("script exhausted");
            }
            replies.remove(0)
        }
    }

    fn backend(replies: Vec<anyhow::Result<String>>) -> (Backend, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let provider = Scripted {
            replies: Mutex::new(replies),
            prompts: Arc::clone(&prompts),
        };
        (
            Backend::new(BackendKind::Anthropic, "test-model", 0.7, Box::new(provider)),
            prompts,
        )
    }

    fn pipeline(dir: &tempfile::TempDir) -> GenerationPipeline {
        let store = StyleStore::open(dir.path().join("style_guide.json")).unwrap();
        GenerationPipeline::new(
            Arc::new(store),
            GenerationConfig::default(),
            ResearchConfig::default(),
        )
    }

    fn request() -> GenerationRequest {
        let mut request = GenerationRequest::new(Platform::X);
        request.facts = vec!["SEBI issued new rules".into()];
        request.research.allow = false;
        request
    }

    #[tokio::test]
    async fn no_backend_falls_back_to_template() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = pipeline(&dir).run(request()).await.unwrap();
        assert!(!outcome.metadata.llm);
        assert_eq!(outcome.metadata.backend, "template");
        assert!(outcome.drafts[0].body.contains("SEBI issued new rules"));
        assert!(outcome.warnings.iter().any(|w| w.contains("structured draft template")));
    }

    #[tokio::test]
    async fn strict_mode_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(&dir).strict(true).run(request()).await.unwrap_err();
        assert_eq!(err.stage, Stage::Generating);
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn backend_failure_is_fatal_not_templated() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _) = backend(vec![Err(anyhow::anyhow!("Anthropic API error (500): boom"))]);
        let err = pipeline(&dir).with_backend(backend).run(request()).await.unwrap_err();
        assert_eq!(err.stage, Stage::Generating);
        assert!(matches!(err.source, GhostpostError::Other(_)));
    }

    #[tokio::test]
    async fn proofread_result_replaces_draft() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, prompts) = backend(vec![
            Ok("SEBI issued new rules, its a big shift.".into()),
            Ok("SEBI issued new rules; it's a big shift.".into()),
        ]);
        let outcome = pipeline(&dir).with_backend(backend).run(request()).await.unwrap();
        assert_eq!(outcome.drafts[0].body, "SEBI issued new rules; it's a big shift.");
        assert!(outcome.metadata.llm);
        assert_eq!(outcome.metadata.model.as_deref(), Some("test-model"));
        assert_eq!(prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn oversized_proofread_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _) = backend(vec![
            Ok("SEBI issued new rules.".into()),
            Ok("SEBI issued new rules. And here is a lot of extra commentary.".into()),
        ]);
        let outcome = pipeline(&dir).with_backend(backend).run(request()).await.unwrap();
        assert_eq!(outcome.drafts[0].body, "SEBI issued new rules.");
        assert!(outcome.warnings.iter().any(|w| w.contains("expanded")));
    }

    #[tokio::test]
    async fn proofread_can_be_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, prompts) = backend(vec![Ok("SEBI issued new rules.".into())]);
        let mut req = request();
        req.proofread = false;
        pipeline(&dir).with_backend(backend).run(req).await.unwrap();
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    struct OneHit;

    #[async_trait]
    impl ResearchProvider for OneHit {
        fn name(&self) -> &str {
            "one-hit"
        }

        async fn fetch(&self, _topic: &str, _max: usize) -> Result<Vec<Snippet>, ProviderError> {
            Ok(vec![Snippet {
                title: "NSE circular".into(),
                url: "https://example.com/nse".into(),
                snippet: "Lot sizes revised to 75".into(),
            }])
        }
    }

    #[tokio::test]
    async fn research_is_summarised_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, prompts) = backend(vec![
            Ok("- Lot sizes revised to 75".into()),
            Ok("SEBI issued new rules. Lot size is now 75 [1].".into()),
        ]);
        let mut req = request();
        req.research.allow = true;
        req.context = "F&O lot size change".into();
        req.proofread = false;

        let outcome = pipeline(&dir)
            .with_backend(backend)
            .with_research(Box::new(OneHit))
            .run(req)
            .await
            .unwrap();

        assert!(outcome.metadata.research_used);
        assert_eq!(outcome.metadata.research_query.as_deref(), Some("F&O lot size change"));
        assert_eq!(outcome.metadata.research_summary.as_deref(), Some("- Lot sizes revised to 75"));
        assert_eq!(outcome.metadata.sources.len(), 1);
        assert!(outcome.drafts[0].body.contains("75 [1]"));

        let prompts = prompts.lock().unwrap();
        assert!(prompts[1].contains("[1] NSE circular: Lot sizes revised to 75"));
        assert!(prompts[1].contains("Research summary:\n- Lot sizes revised to 75"));
    }

    struct FailingGrammar;

    #[async_trait]
    impl GrammarChecker for FailingGrammar {
        fn name(&self) -> &str {
            "failing"
        }

        async fn check(&self, _text: &str) -> Result<Vec<GrammarSuggestion>, ProviderError> {
            Err(ProviderError::Timeout {
                provider: "failing".into(),
            })
        }
    }

    #[tokio::test]
    async fn grammar_failure_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = pipeline(&dir)
            .with_grammar(Box::new(FailingGrammar))
            .run(request())
            .await
            .unwrap();
        assert!(outcome.warnings.iter().any(|w| w.starts_with("Grammar check unavailable")));
    }

    #[tokio::test]
    async fn thread_template_is_segmented() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request();
        req.thread = true;
        let outcome = pipeline(&dir).run(req).await.unwrap();
        let draft = &outcome.drafts[0];
        assert!(draft.is_threaded());
        assert!(draft.render().starts_with("1/2 Data/Example: SEBI issued new rules."));
        assert!(draft.placeholders.contains(&"[ADD TAKEAWAY]".to_string()));
    }
}
