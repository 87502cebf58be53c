use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::{Extracted, html, load_html};
use crate::error::{GhostpostError, ParseError, ProviderError, ValidationError};
use crate::types::Platform;

const FETCH_TIMEOUT_SECS: u64 = 15;
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub platform: Platform,
    pub profile: Option<String>,
    pub html: Option<PathBuf>,
    pub nitter_instance: String,
    pub max_posts: usize,
    pub acknowledge_terms: bool,
    pub acknowledge_risk: bool,
}

/// Collect posts from a live Nitter profile or from saved HTML pages.
///
/// Both acknowledgement flags are required. Live LinkedIn scraping is never
/// attempted; saved LinkedIn pages are accepted.
pub async fn collect(request: &ScrapeRequest) -> Result<Extracted, GhostpostError> {
    if !(request.acknowledge_terms && request.acknowledge_risk) {
        return Err(ValidationError::Refused(
            "refusing to scrape without --i-acknowledge-terms and --i-acknowledge-risk".into(),
        )
        .into());
    }

    if let Some(path) = &request.html {
        let mut posts = load_html(path, request.platform)?;
        posts.truncate(request.max_posts);
        return Ok(Extracted {
            posts,
            source: "html_saved",
            origin: path.display().to_string(),
        });
    }

    if request.platform == Platform::Linkedin {
        return Err(ValidationError::Refused(
            "automated LinkedIn scraping is disabled; use an activity export or saved HTML with --html"
                .into(),
        )
        .into());
    }

    let Some(profile) = request.profile.as_deref().map(|p| p.trim_start_matches('@')) else {
        return Err(ValidationError::Refused("missing --profile for a live Nitter fetch".into()).into());
    };

    let url = profile_url(&request.nitter_instance, profile)?;
    let page = fetch_page(&url).await?;
    let mut posts = html::extract_nitter(&page);
    posts.truncate(request.max_posts);
    tracing::info!(url = %url, posts = posts.len(), "nitter profile fetched");

    Ok(Extracted {
        posts,
        source: "nitter",
        origin: url.to_string(),
    })
}

fn profile_url(instance: &str, profile: &str) -> Result<Url, GhostpostError> {
    let raw = format!("{}/{profile}", instance.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| {
        ParseError::Unreadable {
            path: raw.clone(),
            message: e.to_string(),
        }
        .into()
    })
}

async fn fetch_page(url: &Url) -> Result<String, ProviderError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(BROWSER_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ProviderError::from_reqwest("nitter", &e))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| ProviderError::from_reqwest("nitter", &e))?;

    response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest("nitter", &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ScrapeRequest {
        ScrapeRequest {
            platform: Platform::X,
            profile: Some("@founder".into()),
            html: None,
            nitter_instance: "https://nitter.net/".into(),
            max_posts: 50,
            acknowledge_terms: true,
            acknowledge_risk: true,
        }
    }

    #[tokio::test]
    async fn refuses_without_both_acknowledgements() {
        let mut req = request();
        req.acknowledge_risk = false;
        let err = collect(&req).await.unwrap_err();
        assert!(err.to_string().contains("--i-acknowledge-risk"));
    }

    #[tokio::test]
    async fn refuses_live_linkedin() {
        let mut req = request();
        req.platform = Platform::Linkedin;
        let err = collect(&req).await.unwrap_err();
        assert!(matches!(err, GhostpostError::Validation(ValidationError::Refused(_))));
    }

    #[test]
    fn profile_url_joins_instance_and_handle() {
        let url = profile_url("https://nitter.net/", "founder").unwrap();
        assert_eq!(url.as_str(), "https://nitter.net/founder");
    }

    #[tokio::test]
    async fn saved_pages_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let item = r#"<div class="timeline-item"><div class="tweet-content">post body words here</div></div>"#;
        std::fs::write(dir.path().join("page.html"), item.repeat(5)).unwrap();

        let mut req = request();
        req.html = Some(dir.path().to_path_buf());
        req.max_posts = 3;
        let extracted = collect(&req).await.unwrap();
        assert_eq!(extracted.posts.len(), 3);
        assert_eq!(extracted.source, "html_saved");
    }
}
