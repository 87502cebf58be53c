use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes issued by the services we talk to.
const KEY_PREFIXES: [&str; 3] = ["sk-ant-", "sk-", "tvly-"];

/// Header, query and JSON spellings that precede a credential.
const KEY_MARKERS: [&str; 10] = [
    "x-api-key: ",
    "X-API-KEY: ",
    "X-Subscription-Token: ",
    "x-subscription-token: ",
    "Authorization: Bearer ",
    "authorization: bearer ",
    "api_key=",
    "apiKey=",
    "\"api_key\":\"",
    "\"api_key\": \"",
];

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

/// Replace the token following every occurrence of `marker`.
fn redact_after(text: &mut String, marker: &str) {
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let start = from + rel;
        let value_start = start + marker.len();
        let value_end = text[value_start..]
            .char_indices()
            .find(|&(_, c)| !is_key_char(c))
            .map_or(text.len(), |(i, _)| value_start + i);

        if value_end == value_start {
            from = value_start;
            continue;
        }
        text.replace_range(start..value_end, REDACTED);
        from = start + REDACTED.len();
    }
}

/// Redact credentials from text that may be shown to a user or logged.
///
/// `known` holds the configured key values themselves; Serper and Brave keys
/// carry no recognisable prefix, so they are matched verbatim.
pub fn scrub_secrets<'a>(input: &'a str, known: &[&str]) -> Cow<'a, str> {
    let known: Vec<&str> = known
        .iter()
        .map(|k| k.trim())
        .filter(|k| k.len() >= 8)
        .collect();
    let has_pattern = KEY_PREFIXES.iter().chain(KEY_MARKERS.iter()).any(|p| input.contains(p));
    let has_known = known.iter().any(|k| input.contains(k));
    if !has_pattern && !has_known {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for key in known {
        scrubbed = scrubbed.replace(key, REDACTED);
    }
    for marker in KEY_PREFIXES.iter().chain(KEY_MARKERS.iter()) {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub and truncate an upstream error body for display.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secrets(input, &[]);
    crate::utils::truncate_with_ellipsis(scrubbed.trim(), MAX_API_ERROR_CHARS)
}

/// Build a sanitized error from a non-success HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable error body>".to_string());
    anyhow::anyhow!(
        "{provider} API error ({status}): {}",
        sanitize_api_error(&body)
    )
}
