//! Historical-post ingestion: document readers, layout extractors, filtering,
//! the JSONL corpus and the style-guide merge.

pub mod corpus;
pub mod dates;
pub mod document;
pub mod html;
pub mod linkedin;
pub mod nitter;
pub mod scrape;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{GhostpostError, ParseError};
use crate::style::{StyleStore, analyze_posts};
use crate::types::{HistoricalPost, Platform};
use crate::utils::text::{normalize_text, tokenize};

pub use dates::DateWindow;
pub use document::DocumentKind;

/// A post as extracted, before normalisation and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub platform: Platform,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Posts pulled out of one source, tagged with where they came from.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub posts: Vec<RawPost>,
    pub source: &'static str,
    pub origin: String,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub window: DateWindow,
    pub min_words: usize,
    pub out: PathBuf,
    pub append: bool,
    pub update_style: bool,
    pub force_update_style: bool,
    pub max_examples: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub extracted: usize,
    pub ingested: usize,
    pub skipped_short: usize,
    pub skipped_duplicate: usize,
    pub skipped_no_date: usize,
    pub skipped_out_of_range: usize,
    pub corpus_path: String,
    pub style_version: Option<u64>,
}

/// Read a LinkedIn activity export: PDF, extracted text, or saved feed pages.
pub fn load_linkedin(
    path: &Path,
    author: &str,
    reference: NaiveDate,
) -> Result<Extracted, ParseError> {
    let (posts, source) = match DocumentKind::detect(path)? {
        DocumentKind::Html => (load_html(path, Platform::Linkedin)?, "html_saved"),
        kind => {
            let text = document::read_text(path)?;
            let source = if kind == DocumentKind::Pdf {
                "linkedin_pdf"
            } else {
                "linkedin_text"
            };
            (linkedin::extract_posts(&text, author, reference), source)
        }
    };
    Ok(Extracted {
        posts,
        source,
        origin: path.display().to_string(),
    })
}

/// Read a Nitter profile export: PDF, extracted text, or saved timeline pages.
pub fn load_nitter(path: &Path, handle: &str) -> Result<Extracted, ParseError> {
    let (posts, source) = match DocumentKind::detect(path)? {
        DocumentKind::Html => (load_html(path, Platform::X)?, "html_saved"),
        kind => {
            let text = document::read_text(path)?;
            let source = if kind == DocumentKind::Pdf {
                "nitter_pdf"
            } else {
                "nitter_text"
            };
            (nitter::extract_posts(&text, handle), source)
        }
    };
    Ok(Extracted {
        posts,
        source,
        origin: path.display().to_string(),
    })
}

pub(crate) fn load_html(path: &Path, platform: Platform) -> Result<Vec<RawPost>, ParseError> {
    let mut posts = Vec::new();
    for file in document::html_files(path)? {
        let page = document::read_html(&file)?;
        posts.extend(html::extract(&page, platform));
    }
    Ok(posts)
}

/// Normalise, then drop short, undated (when windowed), out-of-window and
/// duplicate posts, counting each reason into `report`.
pub fn filter_posts(
    raw: Vec<RawPost>,
    source: &str,
    window: DateWindow,
    min_words: usize,
    report: &mut IngestReport,
) -> Vec<HistoricalPost> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for post in raw {
        let text = normalize_text(&post.text);
        if text.is_empty() || tokenize(&text).len() < min_words {
            report.skipped_short += 1;
            continue;
        }

        if window.is_set() {
            let Some(created_at) = post.created_at else {
                report.skipped_no_date += 1;
                continue;
            };
            if !window.contains(created_at) {
                report.skipped_out_of_range += 1;
                continue;
            }
        }

        let post = HistoricalPost::new(post.platform, text, post.created_at, source);
        if !seen.insert(post.id.clone()) {
            report.skipped_duplicate += 1;
            continue;
        }
        accepted.push(post);
    }

    accepted
}

/// Filter extracted posts into the corpus and, when asked, merge them into
/// the style guide.
///
/// A locked guide without the override fails before anything is written, so
/// the corpus and the guide are both left as they were.
pub async fn ingest(
    extracted: Extracted,
    store: &StyleStore,
    options: &IngestOptions,
) -> Result<IngestReport, GhostpostError> {
    if extracted.posts.is_empty() {
        return Err(ParseError::NoPosts {
            path: extracted.origin,
        }
        .into());
    }
    if options.update_style {
        store.ensure_writable(options.force_update_style)?;
    }

    let mut report = IngestReport {
        extracted: extracted.posts.len(),
        corpus_path: options.out.display().to_string(),
        ..IngestReport::default()
    };
    let accepted = filter_posts(
        extracted.posts,
        extracted.source,
        options.window,
        options.min_words,
        &mut report,
    );
    report.ingested = accepted.len();

    corpus::write_corpus(&options.out, &accepted, options.append)?;
    tracing::info!(
        source = extracted.source,
        ingested = report.ingested,
        skipped_no_date = report.skipped_no_date,
        skipped_out_of_range = report.skipped_out_of_range,
        corpus = %options.out.display(),
        "corpus written"
    );

    if options.update_style {
        let corpus_posts = if options.append {
            corpus::read_corpus(&options.out)?
        } else {
            accepted
        };
        let derived = analyze_posts(&corpus_posts, dates::today());
        let max_examples = options.max_examples;
        let saved = store
            .update(options.force_update_style, |guide| {
                guide.merge(&corpus_posts, derived, max_examples, Utc::now());
            })
            .await?;
        report.style_version = Some(saved.version);
    }

    Ok(report)
}
