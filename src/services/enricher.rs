//! Repository metadata enrichment via the GitHub REST API.
//!
//! Lookups are best-effort: any failure (transport, non-200, bad payload)
//! yields `None` and the caller keeps the scraped data. Nothing here ever
//! fails an aggregation request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{GITHUB_API_URL, USER_AGENT};
use crate::models::RepoMetadata;
use crate::services::page::FetchError;

/// Optional metadata lookup keyed by owner/name. Never errors into the
/// aggregator; "no data" covers every failure mode.
#[async_trait]
pub trait MetadataEnricher: Send + Sync {
    async fn lookup(&self, owner: &str, name: &str) -> Option<RepoMetadata>;
}

/// Wire shape of the `GET /repos/{owner}/{name}` response, reduced to the
/// fields the pipeline cares about.
#[derive(Debug, Deserialize)]
struct ApiRepo {
    description: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    pushed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    html_url: Option<String>,
    default_branch: Option<String>,
}

/// Thin GitHub REST API client with optional bearer-token auth.
pub struct GitHubApiClient {
    client: Client,
    base_url: String,
}

impl GitHubApiClient {
    pub fn new(token: Option<&str>, timeout: Duration) -> Result<Self, FetchError> {
        let mut builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::Client(e.to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl MetadataEnricher for GitHubApiClient {
    async fn lookup(&self, owner: &str, name: &str) -> Option<RepoMetadata> {
        let url = format!("{}/repos/{owner}/{name}", self.base_url);
        debug!("Fetching repository metadata: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("GitHub API request failed for {}/{}: {}", owner, name, e);
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            warn!(
                "GitHub API request for {}/{} returned status {}",
                owner,
                name,
                response.status()
            );
            return None;
        }

        let data: ApiRepo = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                warn!("GitHub API payload for {}/{} was malformed: {}", owner, name, e);
                return None;
            }
        };

        Some(RepoMetadata {
            description: data.description,
            stargazers_count: data.stargazers_count,
            forks_count: data.forks_count,
            updated_at: data.pushed_at.or(data.updated_at),
            html_url: data.html_url,
            default_branch: data.default_branch,
        })
    }
}
