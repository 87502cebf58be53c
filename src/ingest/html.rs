use scraper::{ElementRef, Html, Selector};

use super::RawPost;
use super::dates::parse_date;
use crate::types::Platform;

const LINKEDIN_CONTENT: &str =
    ".feed-shared-update-v2__commentary, .update-components-text, .break-words";

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "invalid css selector");
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Posts from a Nitter timeline page (`.timeline-item` cards).
pub fn extract_nitter(html: &str) -> Vec<RawPost> {
    let (Some(item_sel), Some(content_sel), Some(date_sel)) = (
        selector(".timeline-item"),
        selector(".tweet-content"),
        selector(".tweet-date a[title]"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&item_sel)
        .filter_map(|item| {
            let text = item
                .select(&content_sel)
                .map(element_text)
                .collect::<Vec<_>>()
                .join("\n");
            if text.is_empty() {
                return None;
            }
            let created_at = item
                .select(&date_sel)
                .next()
                .and_then(|a| a.value().attr("title"))
                .and_then(parse_date);
            Some(RawPost {
                platform: Platform::X,
                text,
                created_at,
            })
        })
        .collect()
}

/// Post bodies from a saved LinkedIn feed page. Saved pages carry no
/// machine-readable dates, so every post is undated.
pub fn extract_linkedin(html: &str) -> Vec<RawPost> {
    let Some(content_sel) = selector(LINKEDIN_CONTENT) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&content_sel)
        .filter(|el| {
            // Nested matches are already covered by the outermost one.
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| content_sel.matches(&ancestor))
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
        .map(|text| RawPost {
            platform: Platform::Linkedin,
            text,
            created_at: None,
        })
        .collect()
}

pub fn extract(html: &str, platform: Platform) -> Vec<RawPost> {
    match platform {
        Platform::X => extract_nitter(html),
        Platform::Linkedin => extract_linkedin(html),
    }
}
