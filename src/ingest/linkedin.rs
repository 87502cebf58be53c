use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::RawPost;
use super::dates::{is_time_line, resolve_activity_date};
use crate::types::Platform;

/// Lines after the author line that may hold the activity timestamp.
const TIME_LINE_LOOKAHEAD: usize = 11;

const NOISE_LINES: &[&str] = &[
    "like",
    "comment",
    "repost",
    "send",
    "following",
    "message",
    "all activity",
    "posts",
    "comments",
    "videos",
    "images",
    "more",
    "me",
    "for business",
    "reactivate",
];

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+:\d+").expect("valid regex"));
static COUNTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,]+$").expect("valid regex"));
static ENGAGEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\d,]+ comments|[\d,]+ reposts|and [\d,]+ others").expect("valid regex")
});
static SPEED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+x$").expect("valid regex"));

fn is_noise(line: &str) -> bool {
    let lower = line.to_lowercase();
    NOISE_LINES.contains(&lower.as_str())
        || lower.starts_with("premium:")
        || lower.starts_with("reactivate")
        || CLOCK_RE.is_match(&lower)
        || COUNTER_RE.is_match(line)
        || ENGAGEMENT_RE.is_match(&lower)
        || SPEED_RE.is_match(&lower)
}

/// Drop UI chrome and collapse blank runs to single paragraph breaks.
fn clean_content(lines: &[&str]) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    for line in lines {
        if line.is_empty() {
            if cleaned.last().is_some_and(|l| !l.is_empty()) {
                cleaned.push("");
            }
            continue;
        }
        if is_noise(line) {
            continue;
        }
        cleaned.push(line);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n").trim().to_string()
}

/// Split the text of a LinkedIn activity export into posts.
///
/// A post opens on a line equal to `author`; its timestamp is the first
/// time-like line shortly after, and its body runs to the next author line.
/// Author lines with no timestamp nearby are skipped.
pub fn extract_posts(text: &str, author: &str, reference: NaiveDate) -> Vec<RawPost> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut posts = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i] != author {
            i += 1;
            continue;
        }

        let window_end = (i + 1 + TIME_LINE_LOOKAHEAD).min(lines.len());
        let Some(date_idx) = (i + 1..window_end).find(|&j| is_time_line(lines[j])) else {
            i += 1;
            continue;
        };
        let created_at = resolve_activity_date(lines[date_idx], reference);

        let mut end = date_idx + 1;
        while end < lines.len() && lines[end] != author {
            end += 1;
        }

        let body = clean_content(&lines[date_idx + 1..end]);
        if !body.is_empty() {
            posts.push(RawPost {
                platform: Platform::Linkedin,
                text: body,
                created_at,
            });
        }
        i = end;
    }

    posts
}
