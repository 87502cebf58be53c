//! Structured draft used when no generation backend is configured.
//!
//! The output deliberately carries `[ADD ...]` markers: it is a skeleton for
//! the author to fill in, not a finished post.

use crate::types::{GenerationRequest, Platform};

const DEFAULT_ANGLE: &str = "pragmatic, balanced take";
const DEFAULT_CTA: &str = "What do you think?";

/// Render the fallback draft for `request`.
pub fn render_template(request: &GenerationRequest) -> String {
    let facts = if request.facts.is_empty() {
        "[ADD FACT]".to_string()
    } else {
        request.facts.join("; ")
    };
    let angle = request.angle.as_deref().unwrap_or(DEFAULT_ANGLE);
    let cta = request.call_to_action.as_deref().unwrap_or(DEFAULT_CTA);
    let context = request.context.trim();

    match request.platform {
        Platform::X if request.thread => {
            let posts: Vec<String> = [
                context.to_string(),
                format!("Data/Example: {facts}. {angle}."),
                format!("Takeaway: [ADD TAKEAWAY]. {cta}"),
            ]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
            let total = posts.len();
            posts
                .iter()
                .enumerate()
                .map(|(i, post)| format!("{}/{total} {post}", i + 1))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Platform::X => {
            let lead = if context.is_empty() {
                String::new()
            } else {
                format!("{context} ")
            };
            format!("{lead}Data: {facts}. {angle}. {cta}")
        }
        Platform::Linkedin => format!(
            "{context}\n\nData or example: {facts}.\n\nWhat we learned / did: [ADD DETAIL].\n\nTakeaway: {angle}. {cta}"
        )
        .trim_start()
        .to_string(),
    }
}
