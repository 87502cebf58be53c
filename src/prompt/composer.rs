use std::sync::LazyLock;

use serde::Serialize;
use tera::Context;

use super::engine::TeraEngine;
use crate::style::StyleGuide;
use crate::types::{GenerationRequest, Platform, ResearchContext};
use crate::utils::truncate_with_ellipsis;

/// Placeholder the generator must write for any unsupported claim.
pub const FACT_PLACEHOLDER: &str = "[ADD FACT]";
/// Line that separates variants in generator output.
pub const VARIANT_SEPARATOR: &str = "---";

const SNIPPET_MAX_CHARS: usize = 277;
const MAX_OPENERS: usize = 5;
const MAX_PHRASES: usize = 8;
const MAX_LEXICON: usize = 12;
const MAX_EXAMPLES: usize = 3;
const EXAMPLE_MAX_CHARS: usize = 240;

const SYSTEM_TEMPLATE: &str = r#"You are ghostwriting public posts as {{ persona }}.
Voice: {{ tone }}.

Do:
{% for rule in do_rules %}- {{ rule }}
{% endfor %}
Don't:
{% for rule in dont_rules %}- {{ rule }}
{% endfor %}
Formatting:
{% for rule in formatting %}- {{ rule }}
{% endfor %}{% if abbreviations %}- Preferred abbreviations: {{ abbreviations }}
{% endif %}{% if not allow_hashtags %}- No hashtags.
{% endif %}{% if not allow_emoji %}- No emoji.
{% endif %}
{% if signature_phrases %}Signature phrases (use sparingly when they fit): {{ signature_phrases }}

{% endif %}Guardrails:
{% for rule in guardrails %}- {{ rule }}
{% endfor %}- Only the supplied facts may be stated as facts. Where a claim needs a fact that was not supplied, write [ADD FACT] instead.
- Never invent numbers, dates, names or quotes.

Platform: {{ platform }}
Thread: {% if thread %}yes{% else %}no{% endif %}
Target words: {{ target_words }}
Max chars per post: {{ max_chars }}

Observed patterns from recent public posts (use lightly; don't force):
- Common openers: {{ openers }}
- Common closers: {{ closers }}
- Common phrases: {{ phrases }}
- Avg sentence words: {{ avg_sentence_words }}
- Question rate: {{ question_rate }}
{% if lexicon %}- Familiar vocabulary: {{ lexicon }}
{% endif %}{% if examples %}
Example fragments of the real voice (never copy them):
{% for example in examples %}> {{ example }}
{% endfor %}{% endif %}
Output format:
- Provide {{ variants }} distinct variant{% if variants > 1 %}s{% endif %}.
- Separate variants with a line containing only ---
{% if thread %}- Label each post of the thread '1/N', '2/N' and so on, one post per line, each at most {{ max_chars }} characters.
{% elif single_post %}- Each variant is a single post of at most {{ max_chars }} characters.
{% else %}- Use 3-6 short paragraphs, at most {{ max_chars }} characters in total.
{% endif %}"#;

const USER_TEMPLATE: &str = r#"Context:
{% if context %}{{ context }}{% else %}(none){% endif %}

Facts to include (only these can be stated as facts):
{% if facts %}{% for fact in facts %}- {{ fact }}
{% endfor %}{% else %}(none provided)
{% endif %}
Angle / stance:
{{ angle }}

Optional CTA or question:
{{ cta }}

Research snippets (use only if needed; cite with [#] when you use them):
{% if snippets %}{% for s in snippets %}[{{ loop.index }}] {{ s.title }}: {{ s.snippet }} (Source: {{ s.url }})
{% endfor %}{% else %}(none)
{% endif %}
Research summary:
{{ summary }}

If a key fact is missing, insert the [ADD FACT] placeholder. Do not invent numbers."#;

const SYSTEM_NAME: &str = "draft_system";
const USER_NAME: &str = "draft_user";

static ENGINE: LazyLock<anyhow::Result<TeraEngine>> = LazyLock::new(|| {
    TeraEngine::with_templates(&[(SYSTEM_NAME, SYSTEM_TEMPLATE), (USER_NAME, USER_TEMPLATE)])
});

/// System and user text for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct SnippetView<'a> {
    title: &'a str,
    url: &'a str,
    snippet: String,
}

fn join_or_na(items: &[String], limit: usize) -> String {
    if items.is_empty() {
        return "n/a".into();
    }
    items.iter().take(limit).cloned().collect::<Vec<_>>().join(", ")
}

/// Per-post character ceiling: the request wins, then the guide, then the platform.
pub fn effective_max_chars(guide: &StyleGuide, request: &GenerationRequest) -> usize {
    request
        .max_chars
        .filter(|&n| n > 0)
        .unwrap_or_else(|| guide.max_chars(request.platform))
}

fn system_context(guide: &StyleGuide, request: &GenerationRequest) -> Context {
    let platform = request.platform;
    let stats = guide
        .derived
        .as_ref()
        .and_then(|d| d.for_platform(platform));

    let mut ctx = Context::new();
    ctx.insert("persona", &guide.persona);
    ctx.insert("tone", &guide.tone_rules.join(", "));
    ctx.insert("do_rules", &guide.do_rules);
    ctx.insert("dont_rules", &guide.dont_rules);
    ctx.insert("formatting", &guide.formatting);
    ctx.insert("abbreviations", &guide.preferred_abbreviations.join(", "));
    ctx.insert("signature_phrases", &guide.signature_phrases.join(", "));
    ctx.insert("guardrails", &guide.guardrails);
    ctx.insert("allow_hashtags", &guide.policy.allow_hashtags);
    ctx.insert("allow_emoji", &guide.policy.allow_emoji);

    ctx.insert("platform", platform.label());
    ctx.insert("thread", &request.thread);
    ctx.insert("single_post", &(platform == Platform::X));
    ctx.insert("target_words", guide.target_words(platform).unwrap_or("n/a"));
    ctx.insert("max_chars", &effective_max_chars(guide, request));
    ctx.insert("variants", &request.variants);

    let (openers, closers, phrases, avg_sentence, question_rate) = match stats {
        Some(s) => (
            join_or_na(&s.common_openers, MAX_OPENERS),
            join_or_na(&s.common_closers, MAX_OPENERS),
            join_or_na(&s.common_phrases, MAX_PHRASES),
            s.avg_sentence_words.to_string(),
            s.question_rate.to_string(),
        ),
        None => ("n/a".into(), "n/a".into(), "n/a".into(), "n/a".into(), "n/a".into()),
    };
    ctx.insert("openers", &openers);
    ctx.insert("closers", &closers);
    ctx.insert("phrases", &phrases);
    ctx.insert("avg_sentence_words", &avg_sentence);
    ctx.insert("question_rate", &question_rate);

    let lexicon: Vec<&str> = guide.lexicon.iter().take(MAX_LEXICON).map(String::as_str).collect();
    ctx.insert("lexicon", &lexicon.join(", "));

    let examples: Vec<String> = guide
        .examples
        .iter()
        .filter(|e| e.platform == platform)
        .take(MAX_EXAMPLES)
        .map(|e| truncate_with_ellipsis(&e.text.replace('\n', " "), EXAMPLE_MAX_CHARS))
        .collect();
    ctx.insert("examples", &examples);
    ctx
}

fn user_context(request: &GenerationRequest, research: &ResearchContext) -> Context {
    let snippets: Vec<SnippetView<'_>> = research
        .snippets
        .iter()
        .map(|s| SnippetView {
            title: &s.title,
            url: &s.url,
            snippet: truncate_with_ellipsis(s.snippet.trim(), SNIPPET_MAX_CHARS),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("context", &request.context);
    ctx.insert("facts", &request.facts);
    ctx.insert("angle", request.angle.as_deref().unwrap_or("(none)"));
    ctx.insert("cta", request.call_to_action.as_deref().unwrap_or("(none)"));
    ctx.insert("snippets", &snippets);
    ctx.insert("summary", research.summary.as_deref().unwrap_or("(none)"));
    ctx
}

/// Build the generation prompt for `request` in the voice of `guide`.
///
/// Pure: identical inputs give byte-identical output.
pub fn compose(
    guide: &StyleGuide,
    request: &GenerationRequest,
    research: &ResearchContext,
) -> anyhow::Result<ComposedPrompt> {
    let engine = ENGINE
        .as_ref()
        .map_err(|e| anyhow::anyhow!("prompt templates failed to load: {e}"))?;

    let system = engine.render(SYSTEM_NAME, &system_context(guide, request))?;
    let user = engine.render(USER_NAME, &user_context(request, research))?;

    Ok(ComposedPrompt {
        system: system.trim_end().to_string(),
        user: user.trim_end().to_string(),
    })
}
