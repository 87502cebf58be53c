use std::sync::LazyLock;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use regex::Regex;

use crate::error::ParseError;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(d|w|mo|m|y|yr|h|hr|hrs|hours)$").expect("valid regex")
});
static DAY_MON_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2} [A-Za-z]{3} \d{4}$").expect("valid regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y %H:%M",
    "%b %d, %Y %I:%M %p",
    "%d %b %Y %H:%M",
    "%d %b %Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%d %b %Y", "%m/%d/%Y", "%d/%m/%Y"];

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Parse an absolute timestamp in any of the formats exports use.
///
/// Offsets are honoured and normalised to UTC; naive values are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let cleaned = value.replace("Â·", "").replace('·', "").replace("  ", " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    // Nitter titles end in a bare zone name, which chrono cannot parse.
    let cleaned = cleaned.strip_suffix(" UTC").unwrap_or(cleaned).trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(cleaned, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(midnight(date));
        }
    }
    None
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_day(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate(value.to_string()))
}

fn strip_decorations(label: &str) -> String {
    label.replace('•', "").replace("ago", "").trim().to_string()
}

/// True for lines that look like an activity timestamp: an absolute date or a
/// relative age such as `3d`, `2w`, `1mo`, `5h`.
pub fn is_time_line(line: &str) -> bool {
    let cleaned = line.replace('•', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return false;
    }
    parse_date(cleaned).is_some() || RELATIVE_RE.is_match(cleaned)
}

/// `D Mon YYYY`, the date layout of a Nitter timeline.
pub fn is_day_month_year(line: &str) -> bool {
    DAY_MON_YEAR_RE.is_match(line.trim())
}

/// Resolve an activity label against `reference`, the day the export was made.
///
/// Relative ages count back from midnight of the reference date. Month and
/// year arithmetic clamps to the last valid day (Mar 31 - 1mo = Feb 29/28).
/// Ages that fall outside chrono's range resolve to `None`.
pub fn resolve_activity_date(label: &str, reference: NaiveDate) -> Option<DateTime<Utc>> {
    let cleaned = strip_decorations(label);
    if let Some(absolute) = parse_date(&cleaned) {
        return Some(absolute);
    }

    let caps = RELATIVE_RE.captures(&cleaned)?;
    let value: u32 = caps[1].parse().ok()?;
    let unit = caps[2].to_lowercase();
    let base = midnight(reference);

    let age = i64::from(value);
    match unit.as_str() {
        "d" => base.checked_sub_signed(TimeDelta::try_days(age)?),
        "w" => base.checked_sub_signed(TimeDelta::try_weeks(age)?),
        "h" | "hr" | "hrs" | "hours" => base.checked_sub_signed(TimeDelta::try_hours(age)?),
        "mo" | "m" => reference.checked_sub_months(Months::new(value)).map(midnight),
        "y" | "yr" => reference
            .checked_sub_months(Months::new(value.checked_mul(12)?))
            .map(midnight),
        _ => None,
    }
}

/// Inclusive day-granularity window. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub fn is_set(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        self.since.is_none_or(|since| day >= since) && self.until.is_none_or(|until| day <= until)
    }
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_absolute_formats() {
        for input in [
            "2024-03-05",
            "2024-03-05 10:30:00",
            "Mar 05, 2024",
            "5 Mar 2024",
            "03/05/2024",
            "2024-03-05T10:30:00Z",
            "Tue, 05 Mar 2024 10:30:00 +0000",
            "Mar 5, 2024 · 10:30 AM UTC",
        ] {
            let parsed = parse_date(input).unwrap_or_else(|| panic!("failed on {input}"));
            assert_eq!(parsed.date_naive(), day(2024, 3, 5), "{input}");
        }
    }

    #[test]
    fn offsets_normalise_to_utc() {
        let parsed = parse_date("2024-03-05T01:00:00+05:30").unwrap();
        assert_eq!(parsed.date_naive(), day(2024, 3, 4));
    }

    #[test]
    fn garbage_is_not_a_date() {
        assert!(parse_date("Like").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn parse_day_rejects_other_layouts() {
        assert_eq!(parse_day("2024-01-31").unwrap(), day(2024, 1, 31));
        assert!(matches!(parse_day("31/01/2024"), Err(ParseError::InvalidDate(_))));
    }

    #[test]
    fn time_lines_include_relative_ages() {
        assert!(is_time_line("3d •"));
        assert!(is_time_line("2w"));
        assert!(is_time_line("1mo"));
        assert!(is_time_line("12 hrs"));
        assert!(is_time_line("Mar 5, 2024"));
        assert!(!is_time_line("Nithin Kamath"));
        assert!(!is_time_line("3 comments"));
    }

    #[test]
    fn relative_dates_count_back_from_reference() {
        let reference = day(2024, 3, 31);
        let resolve = |label| resolve_activity_date(label, reference).unwrap().date_naive();

        assert_eq!(resolve("3d •"), day(2024, 3, 28));
        assert_eq!(resolve("2w ago"), day(2024, 3, 17));
        assert_eq!(resolve("5h"), day(2024, 3, 30));
        assert_eq!(resolve("1mo"), day(2024, 2, 29));
        assert_eq!(resolve("1y"), day(2023, 3, 31));
    }

    #[test]
    fn out_of_range_ages_do_not_resolve() {
        let reference = day(2024, 3, 31);
        for label in ["999999999d", "4000000000w", "4294967295h", "4294967295mo", "400000000y"] {
            assert!(resolve_activity_date(label, reference).is_none(), "{label}");
        }
    }

    #[test]
    fn leap_day_minus_a_year_clamps() {
        let resolved = resolve_activity_date("1yr", day(2024, 2, 29)).unwrap();
        assert_eq!(resolved.date_naive(), day(2023, 2, 28));
    }

    #[test]
    fn nitter_date_lines() {
        assert!(is_day_month_year("5 Mar 2024"));
        assert!(is_day_month_year("15 Dec 2023"));
        assert!(!is_day_month_year("Mar 5, 2024"));
    }

    #[test]
    fn window_is_inclusive_at_day_granularity() {
        let window = DateWindow::new(Some(day(2024, 1, 1)), Some(day(2024, 1, 31)));
        let at = |d: NaiveDate, h: u32| Utc.from_utc_datetime(&d.and_hms_opt(h, 0, 0).unwrap());

        assert!(window.contains(at(day(2024, 1, 1), 0)));
        assert!(window.contains(at(day(2024, 1, 31), 23)));
        assert!(!window.contains(at(day(2023, 12, 31), 23)));
        assert!(!window.contains(at(day(2024, 2, 1), 0)));
        assert!(DateWindow::default().contains(at(day(1999, 1, 1), 0)));
    }
}
