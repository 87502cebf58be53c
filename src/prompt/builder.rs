use super::composer::ComposedPrompt;
use super::engine::TeraEngine;
use crate::types::{Platform, Snippet};
use std::sync::LazyLock;
use tera::Context;

const SUMMARY_SYSTEM: &str = "You are a research assistant. Summarize the sources into 3-5 bullets. \
Use only the provided snippets. Do not add new facts.";

const SUMMARY_TEMPLATE: &str = "\
Context:
{% if context %}{{ context }}{% else %}(none){% endif %}

Sources:
{% for s in snippets %}[{{ loop.index }}] {{ s.title }}: {{ s.snippet }}
{% endfor %}
Return 3-5 concise bullets.";

const PROOFREAD_SYSTEM: &str = "You are a careful editor. Fix grammar, spelling and punctuation only. \
Do not change meaning or tone, and do not add or remove facts. \
Preserve citations like [1] and placeholders like [ADD FACT]. Keep thread numbering as-is. \
Keep any line containing only --- where it is.";

const PROOFREAD_TEMPLATE: &str = "Proofread this {{ platform }} draft:\n\n{{ draft }}";

const SUMMARY_NAME: &str = "research_summary";
const PROOFREAD_NAME: &str = "proofread";

static ENGINE: LazyLock<anyhow::Result<TeraEngine>> = LazyLock::new(|| {
    TeraEngine::with_templates(&[
        (SUMMARY_NAME, SUMMARY_TEMPLATE),
        (PROOFREAD_NAME, PROOFREAD_TEMPLATE),
    ])
});

fn engine() -> anyhow::Result<&'static TeraEngine> {
    ENGINE
        .as_ref()
        .map_err(|e| anyhow::anyhow!("prompt templates failed to load: {e}"))
}

/// Prompt asking the model to condense research snippets into bullets.
pub fn build_summary_prompt(context: &str, snippets: &[Snippet]) -> anyhow::Result<ComposedPrompt> {
    let mut ctx = Context::new();
    ctx.insert("context", context.trim());
    ctx.insert("snippets", snippets);

    Ok(ComposedPrompt {
        system: SUMMARY_SYSTEM.to_string(),
        user: engine()?.render(SUMMARY_NAME, &ctx)?,
    })
}

/// Prompt asking the model to fix surface errors in a generated draft.
pub fn build_proofread_prompt(platform: Platform, draft: &str) -> anyhow::Result<ComposedPrompt> {
    let mut ctx = Context::new();
    ctx.insert("platform", platform.label());
    ctx.insert("draft", draft);

    Ok(ComposedPrompt {
        system: PROOFREAD_SYSTEM.to_string(),
        user: engine()?.render(PROOFREAD_NAME, &ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(title: &str, text: &str) -> Snippet {
        Snippet {
            title: title.into(),
            url: format!("https://example.com/{title}"),
            snippet: text.into(),
        }
    }

    #[test]
    fn summary_numbers_sources_in_order() {
        let prompt = build_summary_prompt(
            "  F&O changes ",
            &[snippet("one", "first"), snippet("two", "second")],
        )
        .unwrap();
        assert!(prompt.system.contains("Use only the provided snippets"));
        assert!(prompt.user.starts_with("Context:\nF&O changes\n"));
        assert!(prompt.user.contains("[1] one: first\n[2] two: second\n"));
        assert!(prompt.user.ends_with("Return 3-5 concise bullets."));
    }

    #[test]
    fn summary_without_context_says_none() {
        let prompt = build_summary_prompt("", &[snippet("a", "b")]).unwrap();
        assert!(prompt.user.starts_with("Context:\n(none)"));
    }

    #[test]
    fn proofread_keeps_draft_verbatim() {
        let draft = "1/2 Lot sizes go up [ADD FACT]\n2/2 Thoughts?";
        let prompt = build_proofread_prompt(Platform::X, draft).unwrap();
        assert!(prompt.user.starts_with("Proofread this X draft:"));
        assert!(prompt.user.ends_with(draft));
        assert!(prompt.system.contains("Keep thread numbering"));
    }
}
