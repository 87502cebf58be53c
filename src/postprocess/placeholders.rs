use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Loose spellings models use for a missing-fact marker: `[add fact]`,
/// `{ADD FACT}`, `<ADD FACT>`, `[FACT NEEDED]`, `[ADD FACT HERE]`.
static LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\[{<]\s*(?:(add|insert)\s+)?(facts?|takeaways?|details?|data|numbers?|stats?|sources?|examples?)(?:\s+(needed|here|required))?\s*[\]}>]",
    )
    .expect("valid placeholder regex")
});

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ADD [A-Z]+\]").expect("valid marker regex"));

fn canonical_noun(noun: &str) -> &'static str {
    match noun.to_ascii_lowercase().trim_end_matches('s') {
        "takeaway" => "TAKEAWAY",
        "detail" => "DETAIL",
        "source" => "SOURCE",
        "example" => "EXAMPLE",
        _ => "FACT",
    }
}

/// Rewrite placeholder variants to the bracketed upper-case form.
pub fn normalize_placeholders(text: &str) -> String {
    LOOSE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let noun = &caps[2];
            let qualified = caps.get(1).is_some()
                || caps.get(3).is_some()
                || noun.eq_ignore_ascii_case("fact")
                || noun.eq_ignore_ascii_case("facts");
            if qualified {
                format!("[ADD {}]", canonical_noun(noun))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Distinct canonical markers in order of first appearance.
pub fn collect_markers(text: &str) -> Vec<String> {
    let mut markers: Vec<String> = Vec::new();
    for m in CANONICAL_RE.find_iter(text) {
        if !markers.iter().any(|existing| existing == m.as_str()) {
            markers.push(m.as_str().to_string());
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_become_canonical() {
        for loose in [
            "[add fact]",
            "{ADD FACT}",
            "<ADD FACT>",
            "[FACT NEEDED]",
            "[ADD FACT HERE]",
            "[ Insert facts ]",
            "[fact]",
        ] {
            assert_eq!(normalize_placeholders(loose), "[ADD FACT]", "{loose}");
        }
    }

    #[test]
    fn other_markers_keep_their_noun() {
        assert_eq!(
            normalize_placeholders("Takeaway: [add takeaway]. [Add detail]"),
            "Takeaway: [ADD TAKEAWAY]. [ADD DETAIL]"
        );
    }

    #[test]
    fn ordinary_brackets_are_untouched() {
        let text = "See [1] and <data> plus [example]";
        assert_eq!(normalize_placeholders(text), text);
    }

    #[test]
    fn markers_are_distinct_and_ordered() {
        let text = "[ADD FACT] then [ADD TAKEAWAY] and [ADD FACT]";
        assert_eq!(collect_markers(text), vec!["[ADD FACT]", "[ADD TAKEAWAY]"]);
        assert!(collect_markers("nothing here").is_empty());
    }
}
