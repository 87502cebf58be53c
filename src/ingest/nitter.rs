use std::sync::LazyLock;

use regex::Regex;

use super::RawPost;
use super::dates::{is_day_month_year, parse_date};
use crate::types::Platform;

/// Lines after the handle line that may hold the `D Mon YYYY` date.
const DATE_LOOKAHEAD: usize = 7;

const NOISE_LINES: &[&str] = &[
    "nitter",
    "load newest",
    "tweets",
    "tweets & replies",
    "media",
    "search",
    "show this thread",
    "more",
];

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,.]+$").expect("valid regex"));

/// Icon-font glyphs (reply, retweet, like counters) live in the private use area.
fn starts_with_icon(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| ('\u{E000}'..='\u{F8FF}').contains(&c))
}

fn clean_content(lines: &[&str], handle: &str) -> String {
    let handle = handle.to_lowercase();
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
            continue;
        }
        let lower = line.to_lowercase();
        if NOISE_LINES.contains(&lower.as_str())
            || lower.starts_with(&handle)
            || starts_with_icon(line)
            || NUMBER_RE.is_match(line)
        {
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs.join("\n\n").trim().to_string()
}

/// Split the text of a Nitter profile export into posts.
///
/// A post opens on any line containing `handle`; the date is the first
/// `D Mon YYYY` line shortly after. Wrapped lines are joined into paragraphs.
pub fn extract_posts(text: &str, handle: &str) -> Vec<RawPost> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut posts = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].contains(handle) {
            i += 1;
            continue;
        }

        let window_end = (i + 1 + DATE_LOOKAHEAD).min(lines.len());
        let Some(date_idx) = (i + 1..window_end).find(|&j| is_day_month_year(lines[j])) else {
            i += 1;
            continue;
        };

        let mut end = date_idx + 1;
        while end < lines.len() && !lines[end].contains(handle) {
            end += 1;
        }

        let body = clean_content(&lines[date_idx + 1..end], handle);
        if !body.is_empty() {
            posts.push(RawPost {
                platform: Platform::X,
                text: body,
                created_at: parse_date(lines[date_idx]),
            });
        }
        i = end;
    }

    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HANDLE: &str = "@founder";

    #[test]
    fn joins_wrapped_lines_into_paragraphs() {
        let export = "\
Jane Founder
@founder
5 Mar 2024
Markets reward patience
over long periods.

Stay invested.
\u{e802} 12
1,024
Jane Founder @founder
4 Mar 2024
Another short note here.
Show this thread
";
        let posts = extract_posts(export, HANDLE);
        assert_eq!(posts.len(), 2);
        assert_eq!(
            posts[0].text,
            "Markets reward patience over long periods.\n\nStay invested."
        );
        assert_eq!(
            posts[0].created_at.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(posts[0].platform, Platform::X);
        assert_eq!(posts[1].text, "Another short note here.");
    }

    #[test]
    fn handle_without_date_is_skipped() {
        let export = "@founder\nno date\nbody text\n";
        assert!(extract_posts(export, HANDLE).is_empty());
    }
}
