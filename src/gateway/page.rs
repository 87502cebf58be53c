use crate::prompt::TeraEngine;
use crate::types::{GenerationOutcome, Platform};
use serde::Serialize;
use std::sync::LazyLock;
use tera::Context;

// The `.html` suffix switches on Tera's autoescaping.
const PAGE_NAME: &str = "index.html";

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ghostpost</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: .8rem; font-weight: 600; }
input[type=text], textarea, select { width: 100%; padding: .4rem; }
pre { white-space: pre-wrap; background: #f5f5f5; padding: .8rem; }
.warn { color: #8a5300; }
.error { color: #b00020; }
</style>
</head>
<body>
<h1>ghostpost</h1>
<form method="post" action="/generate">
<label>Platform
<select name="platform">
{% for p in platforms %}<option value="{{ p.value }}"{% if p.value == form.platform %} selected{% endif %}>{{ p.label }}</option>
{% endfor %}</select></label>
<label>Context<textarea name="context" rows="4">{{ form.context }}</textarea></label>
<label>Facts (one per line)<textarea name="facts" rows="4">{{ form.facts }}</textarea></label>
<label>Angle<input type="text" name="angle" value="{{ form.angle }}"></label>
<label>Call to action<input type="text" name="cta" value="{{ form.cta }}"></label>
<label>Research query<input type="text" name="research_query" value="{{ form.research_query }}"></label>
<label><input type="checkbox" name="thread"{% if form.thread %} checked{% endif %}> Thread (X only)</label>
<label><input type="checkbox" name="research"{% if form.research %} checked{% endif %}> Allow web research</label>
<label><input type="checkbox" name="proofread"{% if form.proofread %} checked{% endif %}> Proofread</label>
<label>Variants<input type="text" name="variants" value="{{ form.variants }}"></label>
<p><button type="submit">Generate</button></p>
</form>
{% if error %}<p class="error">{{ error }}</p>{% endif %}
{% if outcome %}
<h2>Drafts</h2>
{% for draft in drafts %}<pre>{{ draft }}</pre>
{% endfor %}
{% if outcome.warnings %}<h3>Warnings</h3>
<ul>{% for w in outcome.warnings %}<li class="warn">{{ w }}</li>{% endfor %}</ul>{% endif %}
{% if outcome.metadata.sources %}<h3>Sources</h3>
<ol>{% for s in outcome.metadata.sources %}<li><a href="{{ s.url }}">{{ s.title }}</a></li>{% endfor %}</ol>{% endif %}
<p><small>backend: {{ outcome.metadata.backend }} · request {{ outcome.request_id }}</small></p>
{% endif %}
</body>
</html>
"#;

static ENGINE: LazyLock<anyhow::Result<TeraEngine>> =
    LazyLock::new(|| TeraEngine::with_templates(&[(PAGE_NAME, PAGE_TEMPLATE)]));

/// Values echoed back into the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormEcho {
    pub platform: String,
    pub context: String,
    pub facts: String,
    pub angle: String,
    pub cta: String,
    pub research_query: String,
    pub thread: bool,
    pub research: bool,
    pub proofread: bool,
    pub variants: String,
}

impl Default for FormEcho {
    fn default() -> Self {
        Self {
            platform: Platform::X.to_string(),
            context: String::new(),
            facts: String::new(),
            angle: String::new(),
            cta: String::new(),
            research_query: String::new(),
            thread: false,
            research: true,
            proofread: true,
            variants: "1".into(),
        }
    }
}

#[derive(Serialize)]
struct PlatformOption {
    value: String,
    label: &'static str,
}

pub fn render_page(
    form: &FormEcho,
    outcome: Option<&GenerationOutcome>,
    error: Option<&str>,
) -> anyhow::Result<String> {
    let engine = ENGINE
        .as_ref()
        .map_err(|e| anyhow::anyhow!("page template failed to load: {e}"))?;

    let platforms: Vec<PlatformOption> = Platform::ALL
        .iter()
        .map(|p| PlatformOption {
            value: p.to_string(),
            label: p.label(),
        })
        .collect();
    let drafts: Vec<String> = outcome
        .map(|o| o.drafts.iter().map(crate::types::Draft::render).collect())
        .unwrap_or_default();

    let mut ctx = Context::new();
    ctx.insert("platforms", &platforms);
    ctx.insert("form", form);
    ctx.insert("outcome", &outcome);
    ctx.insert("drafts", &drafts);
    ctx.insert("error", &error);
    engine.render(PAGE_NAME, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_renders_both_platforms() {
        let html = render_page(&FormEcho::default(), None, None).unwrap();
        assert!(html.contains(r#"<option value="x" selected>X</option>"#));
        assert!(html.contains(r#"<option value="linkedin">LinkedIn</option>"#));
        assert!(!html.contains("<h2>Drafts</h2>"));
    }

    #[test]
    fn user_input_is_escaped() {
        let form = FormEcho {
            context: "<script>alert(1)</script>".into(),
            ..FormEcho::default()
        };
        let html = render_page(&form, None, Some("bad <input>")).unwrap();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("bad &lt;input&gt;"));
    }
}
