//! Trending page client.
//!
//! Fetches one trending listing per (language, timeframe) pair and turns it
//! into ordered `CandidateRow`s. Row order reflects page-side rank. A fetch
//! failure here is fatal for the whole aggregation request.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::constants::{GITHUB_TRENDING_URL, USER_AGENT};
use crate::models::{CandidateRow, Timeframe};

/// Unreserved characters stay literal in the language path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Errors raised while fetching a trending listing
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Trending page request failed for {url}: {message}")]
    Http { url: String, message: String },

    #[error("Trending page request failed for {url}: status {status}")]
    Status { url: String, status: u16 },
}

/// Ordered candidate-row producer for a (language, timeframe) pair.
///
/// `language: None` means the global (unfiltered) listing.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(
        &self,
        language: Option<&str>,
        timeframe: Timeframe,
    ) -> Result<Vec<CandidateRow>, FetchError>;
}

/// Scrapes the GitHub trending page into `CandidateRow`s.
pub struct TrendingPageClient {
    client: Client,
    base_url: String,
}

impl TrendingPageClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: GITHUB_TRENDING_URL.to_string(),
        })
    }

    /// Build the listing URL for a language partition and timeframe.
    fn build_url(&self, language: Option<&str>, timeframe: Timeframe) -> String {
        match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(language) => {
                let slug = utf8_percent_encode(language, PATH_SEGMENT);
                format!("{}/{slug}?since={timeframe}", self.base_url)
            }
            None => format!("{}?since={timeframe}", self.base_url),
        }
    }

    /// Extract ordered rows from the listing HTML.
    ///
    /// Sections missing an `owner/name` header are skipped; malformed
    /// numbers degrade to `None` rather than dropping the row.
    fn parse_html(
        html: &str,
        language: Option<&str>,
        timeframe: Timeframe,
    ) -> Vec<CandidateRow> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse("article.Box-row").expect("valid selector");
        let header_selector = Selector::parse("h2 a").expect("valid selector");
        let description_selector = Selector::parse("p").expect("valid selector");
        let language_selector =
            Selector::parse(r#"[itemprop="programmingLanguage"]"#).expect("valid selector");
        let stats_selector = Selector::parse("a.Link--muted").expect("valid selector");
        let delta_selector =
            Selector::parse("span.d-inline-block.float-sm-right").expect("valid selector");
        let delta_fallback_selector =
            Selector::parse("span.color-fg-muted.text-normal").expect("valid selector");

        let mut results = Vec::new();
        for section in document.select(&row_selector) {
            let Some(header) = section.select(&header_selector).next() else {
                continue;
            };
            let identifier: String = element_text(&header)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let mut segments = identifier.split('/');
            let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
                continue;
            };
            let (owner, name) = (owner.trim().to_string(), name.trim().to_string());
            let repo_url = format!("https://github.com/{owner}/{name}");

            let description = section
                .select(&description_selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|s| !s.is_empty());
            let primary_language = section
                .select(&language_selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|s| !s.is_empty());

            let mut total_stars = None;
            let mut forks = None;
            for link in section.select(&stats_selector) {
                let href = link.value().attr("href").unwrap_or_default();
                if href.ends_with("/stargazers") {
                    total_stars = parse_int(&element_text(&link)).and_then(|v| u64::try_from(v).ok());
                } else if href.contains("/forks") || href.contains("/network/members") {
                    forks = parse_int(&element_text(&link)).and_then(|v| u64::try_from(v).ok());
                }
            }

            let delta_text = section
                .select(&delta_selector)
                .next()
                .or_else(|| section.select(&delta_fallback_selector).next())
                .map(|el| element_text(&el))
                .filter(|s| !s.is_empty());
            let stars_in_timeframe = delta_text.as_deref().and_then(parse_int);

            results.push(CandidateRow {
                owner,
                name,
                rank_in_context: results.len() as u32 + 1,
                language_context: language.map(str::to_string),
                description,
                primary_language,
                total_stars,
                forks,
                stars_in_timeframe,
                timeframe_delta_label: delta_text,
                repo_url,
                timeframe,
            });
        }
        results
    }
}

#[async_trait]
impl RowSource for TrendingPageClient {
    async fn fetch(
        &self,
        language: Option<&str>,
        timeframe: Timeframe,
    ) -> Result<Vec<CandidateRow>, FetchError> {
        let url = self.build_url(language, timeframe);
        debug!("Fetching trending page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        Ok(Self::parse_html(&body, language, timeframe))
    }
}

/// Collapse an element's text nodes and trim the result.
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract the digits from a rendered count ("1,234 stars today" -> 1234).
///
/// Returns `None` when no digits remain.
pub fn parse_int(value: &str) -> Option<i64> {
    let cleaned: String = value.chars().filter(char::is_ascii_digit).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body>
        <article class="Box-row">
          <h2 class="h3"><a href="/rust-lang/rust">rust-lang / rust</a></h2>
          <p>Empowering everyone to build reliable software.</p>
          <span itemprop="programmingLanguage">Rust</span>
          <a class="Link--muted" href="/rust-lang/rust/stargazers">95,123</a>
          <a class="Link--muted" href="/rust-lang/rust/forks">12,345</a>
          <span class="d-inline-block float-sm-right">321 stars today</span>
        </article>
        <article class="Box-row">
          <h2 class="h3"><a href="/broken">no-slash-here</a></h2>
        </article>
        <article class="Box-row">
          <h2 class="h3"><a href="/foo/bar">foo / bar</a></h2>
          <a class="Link--muted" href="/foo/bar/stargazers">not-a-number</a>
        </article>
        </body></html>
    "#;

    #[test]
    fn parses_rows_in_page_order() {
        let rows = TrendingPageClient::parse_html(SAMPLE_PAGE, Some("rust"), Timeframe::Daily);
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.owner, "rust-lang");
        assert_eq!(first.name, "rust");
        assert_eq!(first.rank_in_context, 1);
        assert_eq!(first.language_context.as_deref(), Some("rust"));
        assert_eq!(
            first.description.as_deref(),
            Some("Empowering everyone to build reliable software.")
        );
        assert_eq!(first.primary_language.as_deref(), Some("Rust"));
        assert_eq!(first.total_stars, Some(95_123));
        assert_eq!(first.forks, Some(12_345));
        assert_eq!(first.stars_in_timeframe, Some(321));
        assert_eq!(first.timeframe_delta_label.as_deref(), Some("321 stars today"));
        assert_eq!(first.repo_url, "https://github.com/rust-lang/rust");
    }

    #[test]
    fn header_without_slash_is_skipped() {
        let rows = TrendingPageClient::parse_html(SAMPLE_PAGE, None, Timeframe::Daily);
        assert!(rows.iter().all(|r| r.owner != "no-slash-here"));
    }

    #[test]
    fn malformed_counts_degrade_to_none() {
        let rows = TrendingPageClient::parse_html(SAMPLE_PAGE, None, Timeframe::Daily);
        let row = rows.iter().find(|r| r.owner == "foo").unwrap();
        assert_eq!(row.total_stars, None);
        assert_eq!(row.rank_in_context, 2);
    }

    #[test]
    fn build_url_encodes_language_segment() {
        let client = TrendingPageClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.build_url(Some("c++"), Timeframe::Weekly),
            "https://github.com/trending/c%2B%2B?since=weekly"
        );
        assert_eq!(
            client.build_url(Some("objective-c"), Timeframe::Daily),
            "https://github.com/trending/objective-c?since=daily"
        );
        assert_eq!(
            client.build_url(None, Timeframe::Monthly),
            "https://github.com/trending?since=monthly"
        );
    }

    #[test]
    fn parse_int_strips_separators_and_units() {
        assert_eq!(parse_int("1,234 stars today"), Some(1234));
        assert_eq!(parse_int("95.1k"), Some(951));
        assert_eq!(parse_int("no digits"), None);
        assert_eq!(parse_int(""), None);
    }
}
