use super::FACT_PLACEHOLDER;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A figure with an optional currency sign and percent suffix.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£]?\d+(?:[.,]\d+)*%?").expect("valid number regex"));

/// Thread labels at the start of a line are structure, not claims.
static LABEL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?\d{1,3}\s*/\s*\d{1,3}\)?").expect("valid label regex"));

/// Digits only, so `1,000`, `₹1000` and `1000%` compare equal.
fn digits(figure: &str) -> String {
    figure.chars().filter(char::is_ascii_digit).collect()
}

fn figures_in(sources: &[&str]) -> HashSet<String> {
    sources
        .iter()
        .flat_map(|s| NUMBER_RE.find_iter(s))
        .map(|m| digits(m.as_str()))
        .collect()
}

fn guard_line(line: &str, allowed: &HashSet<String>, replaced: &mut usize) -> String {
    let skip_to = LABEL_PREFIX_RE.find(line).map_or(0, |m| m.end());
    let (label, rest) = line.split_at(skip_to);

    let mut out = String::with_capacity(line.len());
    out.push_str(label);
    let mut last = 0;
    for m in NUMBER_RE.find_iter(rest) {
        if m.start() < last {
            continue;
        }
        let before = rest[..m.start()].chars().next_back();
        let after = rest[m.end()..].chars().next();

        let is_citation = before == Some('[') && after == Some(']');
        let is_identifier = before.is_some_and(char::is_alphabetic);
        if is_citation || is_identifier || allowed.contains(&digits(m.as_str())) {
            continue;
        }

        // Suffixed figures (`2nd`, `5x`, `10k`) are replaced as one word.
        let suffix: usize = rest[m.end()..]
            .chars()
            .take_while(|c| c.is_alphanumeric())
            .map(char::len_utf8)
            .sum();

        out.push_str(&rest[last..m.start()]);
        out.push_str(FACT_PLACEHOLDER);
        last = m.end() + suffix;
        *replaced += 1;
    }
    out.push_str(&rest[last..]);
    out
}

/// Replace figures that no supplied source backs with `[ADD FACT]`.
///
/// Returns the guarded text and how many figures were replaced.
pub fn guard_numbers(text: &str, sources: &[&str]) -> (String, usize) {
    let allowed = figures_in(sources);
    let mut replaced = 0;
    let guarded = text
        .split('\n')
        .map(|line| guard_line(line, &allowed, &mut replaced))
        .collect::<Vec<_>>()
        .join("\n");
    (guarded, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_number_is_replaced() {
        let (text, n) = guard_numbers("Volumes fell 35% last month.", &["Volumes fell sharply"]);
        assert_eq!(text, "Volumes fell [ADD FACT] last month.");
        assert_eq!(n, 1);
    }

    #[test]
    fn supplied_numbers_survive_in_any_format() {
        let sources = ["Lot size rises to 1,00,000 from Nov 20"];
        let (text, n) = guard_numbers("From Nov 20 lot sizes hit 100000.", &sources);
        assert_eq!(text, "From Nov 20 lot sizes hit 100000.");
        assert_eq!(n, 0);
    }

    #[test]
    fn labels_citations_and_identifiers_are_kept() {
        let (text, n) = guard_numbers("1/3 Per the circular [2], Q3 and Web3 matter", &[]);
        assert_eq!(text, "1/3 Per the circular [2], Q3 and Web3 matter");
        assert_eq!(n, 0);
    }

    #[test]
    fn suffixed_figures_are_replaced_whole() {
        let (text, n) = guard_numbers("The 2nd launch drew 5x the traffic and 10k signups", &[]);
        assert_eq!(
            text,
            "The [ADD FACT] launch drew [ADD FACT] the traffic and [ADD FACT] signups"
        );
        assert_eq!(n, 3);
    }

    #[test]
    fn supported_ordinals_are_kept() {
        let (text, n) = guard_numbers("Our 3rd office opens", &["third office, 3 cities"]);
        assert_eq!(text, "Our 3rd office opens");
        assert_eq!(n, 0);
    }

    #[test]
    fn currency_and_decimals_are_one_figure() {
        let (text, n) = guard_numbers("We charge ₹20.5 per order", &[]);
        assert_eq!(text, "We charge [ADD FACT] per order");
        assert_eq!(n, 1);
    }

    #[test]
    fn trailing_period_is_not_part_of_the_number() {
        let (text, _) = guard_numbers("Since 2010.", &["founded 2010"]);
        assert_eq!(text, "Since 2010.");
    }

    #[test]
    fn line_structure_is_preserved() {
        let (text, n) = guard_numbers("a 5\n\nb 6", &["5"]);
        assert_eq!(text, "a 5\n\nb [ADD FACT]");
        assert_eq!(n, 1);
    }
}
