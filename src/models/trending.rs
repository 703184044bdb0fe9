//! Data model for the trending aggregation pipeline.
//!
//! `CandidateRow` is what the trending page yields per listing,
//! `RepoMetadata` is the REST API supplement, and `TrendingRepository` is
//! the merged record handed back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::GLOBAL_LANGUAGE;

/// Trending time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "Invalid timeframe: {s}. Valid values are: daily, weekly, monthly"
            )),
        }
    }
}

/// Deduplication key: `lowercase(owner)/lowercase(name)`.
///
/// Two rows with the same key refer to the same repository regardless of
/// which language partition produced them.
pub fn identity_key(owner: &str, name: &str) -> String {
    format!("{}/{}", owner.to_lowercase(), name.to_lowercase())
}

/// One listing as scraped from the trending page for a
/// (language partition, timeframe) pair. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub owner: String,
    pub name: String,
    /// 1-based rank within the partition that produced this row
    pub rank_in_context: u32,
    /// Partition label; `None` means the row came from the global page
    pub language_context: Option<String>,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub total_stars: Option<u64>,
    pub forks: Option<u64>,
    /// Stars gained within the timeframe, when the page exposed a figure
    pub stars_in_timeframe: Option<i64>,
    /// Raw delta label as rendered on the page ("1,234 stars today")
    pub timeframe_delta_label: Option<String>,
    pub repo_url: String,
    pub timeframe: Timeframe,
}

/// Supplementary repository fields from the GitHub REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
    pub default_branch: Option<String>,
}

/// Final merged record: a surviving `CandidateRow` after enrichment,
/// with its global output rank. Serialized directly into the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingRepository {
    /// 1-based rank in the merged result set, contiguous with no gaps
    pub rank: u32,
    pub owner: String,
    pub name: String,
    pub repo_url: String,
    pub timeframe: Timeframe,
    pub rank_in_context: u32,
    /// Effective language: partition label, else detected language,
    /// else "all" when no specific language was requested
    pub language_context: Option<String>,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub total_stars: Option<u64>,
    pub forks: Option<u64>,
    pub stars_in_timeframe: Option<i64>,
    pub timeframe_delta_label: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Resolve the language a merged row is reported under.
///
/// Priority: explicit partition label, then the language detected on the
/// page, then the "all" sentinel when the request had no language filter.
pub fn effective_language(
    context: Option<&str>,
    primary: Option<&str>,
    shared_mode: bool,
) -> Option<String> {
    context
        .map(str::to_string)
        .or_else(|| primary.map(str::to_string))
        .or_else(|| shared_mode.then(|| GLOBAL_LANGUAGE.to_string()))
}

/// Validated aggregation request. Languages are already trimmed and
/// lowercased; `limit` is positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingRequest {
    pub languages: Vec<String>,
    pub limit: u32,
    pub timeframe: Timeframe,
}

/// Which quota mode an aggregation ran under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMode {
    /// Single global partition; the limit is the total row count
    Shared,
    /// One partition per requested language, each with its own quota
    PerLanguage,
}

/// Diagnostic block describing how the quota arithmetic resolved.
///
/// The row list is the ground truth; this block exists for client-side
/// debugging and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub timeframe: Timeframe,
    /// Normalized request languages, or `["all"]` when none were given
    pub languages: Vec<String>,
    /// Number of rows actually returned
    pub retrieved: usize,
    pub limit_mode: LimitMode,
    pub requested_limit: u32,
    /// Shared mode only: the single effective limit figure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Per-language mode only: quota applied to each partition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_per_language: Option<u32>,
    /// Per-language mode only: per-language quota times partition count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_total: Option<u32>,
    /// The overall cap that was actually enforced
    pub effective_limit: u32,
}

/// Top-level aggregation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub metadata: ResponseMetadata,
    pub repos: Vec<TrendingRepository>,
}

/// Query parameters for the trending endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingQuery {
    /// Comma-separated language list, e.g. `languages=python,go`
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// Payload for the language discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageMetadata {
    pub default: String,
    pub supported: Vec<String>,
    pub notes: String,
}
