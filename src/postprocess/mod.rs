//! Turns raw generator output into validated drafts.

mod numbers;
mod placeholders;
pub mod thread;

pub use numbers::guard_numbers;
pub use placeholders::{collect_markers, normalize_placeholders};

use crate::error::ValidationError;
pub use crate::prompt::{FACT_PLACEHOLDER, VARIANT_SEPARATOR};
use crate::types::{Draft, GenerationRequest, Platform, ResearchContext};
use crate::utils::text::{char_len, is_emoji};
use regex::Regex;
use std::sync::LazyLock;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#[A-Za-z]\w*").expect("valid hashtag regex"));

/// Headings such as `Variant 2:` or `**Option 1**` that models put above variants.
static VARIANT_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*[*#_ ]*(variant|option|version|draft)\s*\d+\s*[:.)\-]?[*_ ]*\s*$")
        .expect("valid heading regex")
});

#[derive(Debug, Clone, Copy)]
pub struct PostProcessOptions {
    /// Per-post character ceiling.
    pub limit: usize,
    pub strict_numbers: bool,
    pub allow_hashtags: bool,
    pub allow_emoji: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Processed {
    pub drafts: Vec<Draft>,
    pub warnings: Vec<String>,
}

/// Split raw output on separator lines, dropping headings and empty variants.
pub fn split_variants(raw: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |lines: &mut Vec<&str>| {
        let text = lines.join("\n").trim().to_string();
        if !text.is_empty() {
            variants.push(text);
        }
        lines.clear();
    };

    for line in raw.lines() {
        if line.trim() == VARIANT_SEPARATOR {
            flush(&mut current);
        } else if !VARIANT_HEADING_RE.is_match(line) {
            current.push(line);
        }
    }
    flush(&mut current);
    variants
}

/// Everything the author supplied: the only places a figure may come from.
fn figure_sources<'a>(request: &'a GenerationRequest, research: &'a ResearchContext) -> Vec<&'a str> {
    let mut sources: Vec<&str> = request.facts.iter().map(String::as_str).collect();
    sources.push(&request.context);
    sources.extend(request.angle.as_deref());
    sources.extend(request.call_to_action.as_deref());
    for snippet in &research.snippets {
        sources.push(&snippet.title);
        sources.push(&snippet.snippet);
    }
    sources
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn process_variant(
    text: &str,
    request: &GenerationRequest,
    sources: &[&str],
    options: &PostProcessOptions,
    warnings: &mut Vec<String>,
) -> Result<Draft, ValidationError> {
    let mut text = normalize_placeholders(text);

    if options.strict_numbers {
        let (guarded, replaced) = guard_numbers(&text, sources);
        if replaced > 0 {
            warnings.push(format!(
                "Replaced {replaced} unsupported figure(s) with {FACT_PLACEHOLDER}"
            ));
        }
        text = guarded;
    }

    let threaded = request.platform == Platform::X && request.thread;
    let (body, thread_segments) = if threaded {
        let segments = thread::segment(&text, options.limit)?;
        (segments.join("\n"), segments)
    } else {
        let length = char_len(&text);
        if length > options.limit {
            warnings.push(format!("Post exceeds {} chars ({length}).", options.limit));
        }
        (text, Vec::new())
    };

    // Packing may break a fact across segments, so compare word runs.
    let flat_body = collapse_whitespace(&body);
    for fact in &request.facts {
        if !flat_body.contains(&collapse_whitespace(fact)) {
            warnings.push(format!("Fact not used verbatim: {fact}"));
        }
    }
    if !options.allow_hashtags && HASHTAG_RE.is_match(&body) {
        warnings.push("Draft contains hashtags although the style guide disallows them".into());
    }
    if !options.allow_emoji && body.chars().any(is_emoji) {
        warnings.push("Draft contains emoji although the style guide disallows them".into());
    }

    Ok(Draft {
        placeholders: collect_markers(&body),
        body,
        platform: request.platform,
        thread_segments,
        grammar_suggestions: Vec::new(),
    })
}

/// Run every post-processing step over raw generator output.
pub fn process(
    raw: &str,
    request: &GenerationRequest,
    research: &ResearchContext,
    options: &PostProcessOptions,
) -> Result<Processed, ValidationError> {
    let variants = split_variants(raw);
    if variants.is_empty() {
        return Err(ValidationError::EmptyDraft);
    }

    let sources = figure_sources(request, research);
    let labelled = variants.len() > 1;
    let mut processed = Processed::default();

    for (i, variant) in variants.iter().enumerate() {
        let mut warnings = Vec::new();
        let draft = process_variant(variant, request, &sources, options, &mut warnings)?;
        processed.drafts.push(draft);
        processed.warnings.extend(warnings.into_iter().map(|w| {
            if labelled {
                format!("Variant {}: {w}", i + 1)
            } else {
                w
            }
        }));
    }
    Ok(processed)
}
