use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::guide::{DerivedStats, PlatformStats};
use crate::types::{HistoricalPost, Platform};
use crate::utils::text::{is_emoji, is_stopword, normalize_text, split_sentences, tokenize};

const TOP_OPENERS: usize = 8;
const TOP_PHRASES: usize = 12;

/// Occurrence counter that breaks ties by first appearance.
#[derive(Default)]
struct Tally {
    counts: HashMap<String, (usize, usize)>,
}

impl Tally {
    fn add(&mut self, key: String) {
        let next = self.counts.len();
        self.counts.entry(key).or_insert((0, next)).0 += 1;
    }

    fn most_common(self, n: usize) -> Vec<String> {
        let mut entries: Vec<_> = self.counts.into_iter().collect();
        entries.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
        entries.into_iter().take(n).map(|(k, _)| k).collect()
    }
}

fn rate(hits: usize, total: usize, places: i32) -> f64 {
    round_to(hits as f64 / total.max(1) as f64, places)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn analyze_platform(posts: &[&HistoricalPost]) -> PlatformStats {
    let mut word_counts = Vec::new();
    let mut sentence_lengths = Vec::new();
    let mut questions = 0;
    let mut emoji = 0;
    let mut links = 0;
    let mut openers = Tally::default();
    let mut closers = Tally::default();
    let mut phrases = Tally::default();

    for post in posts {
        if post.text.contains("http") || post.text.contains("www.") {
            links += 1;
        }
        let text = normalize_text(&post.text);
        if text.is_empty() {
            continue;
        }

        let words = tokenize(&text);
        word_counts.push(words.len());
        sentence_lengths.extend(split_sentences(&text).into_iter().map(|s| tokenize(s).len()));
        if text.contains('?') {
            questions += 1;
        }
        if text.chars().any(is_emoji) {
            emoji += 1;
        }

        if words.len() >= 3 {
            openers.add(words[..3].join(" "));
            closers.add(words[words.len() - 3..].join(" "));
        }
        for window in words.windows(3) {
            if window.iter().all(|w| is_stopword(w)) {
                continue;
            }
            phrases.add(window.join(" "));
        }
    }

    let mean = |values: &[usize]| {
        round_to(
            values.iter().sum::<usize>() as f64 / values.len().max(1) as f64,
            2,
        )
    };

    PlatformStats {
        sample_size: posts.len(),
        avg_words_per_post: mean(&word_counts),
        avg_sentence_words: mean(&sentence_lengths),
        question_rate: rate(questions, posts.len(), 3),
        emoji_rate: rate(emoji, posts.len(), 3),
        link_rate: rate(links, posts.len(), 3),
        common_openers: openers.most_common(TOP_OPENERS),
        common_closers: closers.most_common(TOP_OPENERS),
        common_phrases: phrases.most_common(TOP_PHRASES),
    }
}

/// Compute per-platform corpus statistics. Platforms without posts are omitted.
pub fn analyze_posts(posts: &[HistoricalPost], analysis_date: NaiveDate) -> DerivedStats {
    let mut platforms = BTreeMap::new();
    for platform in Platform::ALL {
        let items: Vec<&HistoricalPost> = posts.iter().filter(|p| p.platform == platform).collect();
        if items.is_empty() {
            continue;
        }
        platforms.insert(platform, analyze_platform(&items));
    }
    DerivedStats {
        analysis_date,
        platforms,
    }
}
