use crate::error::ValidationError;
use crate::utils::text::char_len;
use regex::Regex;
use std::sync::LazyLock;

/// `1/5`, `2/5:` or `(3/5)` at the start of a line.
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(?(\d{1,3})\s*/\s*(\d{1,3})\)?[\s.:)\-]*(.*)$").expect("valid label regex")
});

/// Characters a `k/N ` label takes once rendered.
fn label_width(index: usize, total: usize) -> usize {
    format!("{index}/{total} ").len()
}

fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for ch in word.chars() {
        if current_len == max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(ch);
        current_len += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// `24/7` reads like a label but is not one.
fn is_label(index: &str, total: &str) -> bool {
    match (index.parse::<usize>(), total.parse::<usize>()) {
        (Ok(k), Ok(n)) => (1..=n).contains(&k),
        _ => false,
    }
}

/// Split on `k/N` labels. `None` when the text carries no labels at all.
///
/// Unlabelled lines continue the segment above them; text ahead of the
/// first label becomes its own segment.
pub fn parse_labeled(text: &str) -> Option<Vec<String>> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut saw_label = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = LABEL_RE.captures(line)
            && is_label(&caps[1], &caps[2])
        {
            saw_label = true;
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        segments.push(current);
    }
    saw_label.then_some(segments)
}

/// Greedily pack words into segments of at most `budget` characters.
pub fn pack_words(text: &str, budget: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let pieces = if char_len(word) > budget {
            hard_split(word, budget)
        } else {
            vec![word.to_string()]
        };

        for piece in pieces {
            let piece_len = char_len(&piece);
            if current.is_empty() {
                current = piece;
                current_len = piece_len;
            } else if current_len + 1 + piece_len <= budget {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + piece_len;
            } else {
                segments.push(std::mem::replace(&mut current, piece));
                current_len = piece_len;
            }
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Turn a draft into thread segments that each fit `limit` once labelled.
pub fn segment(text: &str, limit: usize) -> Result<Vec<String>, ValidationError> {
    let parsed = parse_labeled(text).unwrap_or_else(|| vec![text.to_string()]);

    // Room for labels up to "99/99 ".
    let budget = limit.saturating_sub(label_width(99, 99)).max(1);
    let mut segments = Vec::new();
    for part in parsed {
        let collapsed = part.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }
        if char_len(&collapsed) + label_width(99, 99) <= limit {
            segments.push(collapsed);
        } else {
            segments.extend(pack_words(&collapsed, budget));
        }
    }

    validate(&segments, limit)?;
    Ok(segments)
}

/// Every labelled segment must fit the per-post limit.
pub fn validate(segments: &[String], limit: usize) -> Result<(), ValidationError> {
    let total = segments.len();
    for (i, segment) in segments.iter().enumerate() {
        let length = label_width(i + 1, total) + char_len(segment);
        if length > limit {
            return Err(ValidationError::SegmentTooLong {
                index: i + 1,
                length,
                limit,
            });
        }
    }
    Ok(())
}
