//! Trending aggregation core.
//!
//! Turns N per-language trending listings into a single merged, deduped,
//! quota-bounded, globally ranked result set, then enriches each surviving
//! row from the REST API.
//!
//! Two quota modes:
//! - shared: no language filter (or the "all" sentinel); one global
//!   partition whose cap is the overall budget.
//! - per-language: one partition per requested language, each with its own
//!   cap, plus a second fill pass so duplicates consumed by early partitions
//!   do not leave later partitions' unused capacity stranded.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{CURATED_LANGUAGES, GLOBAL_LANGUAGE, MAX_LIMIT};
use crate::models::{
    effective_language, identity_key, CandidateRow, LimitMode, ResponseMetadata,
    TrendingRepository, TrendingRequest, TrendingResponse,
};
use crate::services::enricher::MetadataEnricher;
use crate::services::page::{FetchError, RowSource};

/// Errors that can occur during aggregation
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Resolved quota arithmetic for one request
struct FetchPlan {
    /// Partitions in request order; `None` is the global listing
    partitions: Vec<Option<String>>,
    /// Normalized request languages, kept for the metadata block
    normalized_languages: Vec<String>,
    shared_mode: bool,
    per_language_limit: u32,
    intended_total: u32,
    overall_limit: u32,
}

/// Orchestrates fetch, dedup, quota fill and enrichment for one request.
///
/// Holds no state across calls; the identity-key set and partition counters
/// live only for the duration of `aggregate`.
pub struct Aggregator {
    source: Arc<dyn RowSource>,
    enricher: Arc<dyn MetadataEnricher>,
    /// Politeness delay between per-language page fetches; injectable so
    /// tests run instantly
    fetch_delay: Duration,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn RowSource>,
        enricher: Arc<dyn MetadataEnricher>,
        fetch_delay: Duration,
    ) -> Self {
        Self {
            source,
            enricher,
            fetch_delay,
        }
    }

    /// Run the full pipeline: plan partitions, fetch and quota-fill,
    /// enrich survivors, assemble the response.
    ///
    /// A row-source failure for any partition aborts the whole request;
    /// enrichment failures degrade the affected row to scraped data only.
    pub async fn aggregate(
        &self,
        request: &TrendingRequest,
    ) -> Result<TrendingResponse, AggregateError> {
        let plan = self.plan(request)?;

        debug!(
            "Planned {} partition(s), mode={}, per_language_limit={}, overall_limit={}",
            plan.partitions.len(),
            if plan.shared_mode { "shared" } else { "per_language" },
            plan.per_language_limit,
            plan.overall_limit
        );

        let mut remaining = plan.overall_limit;
        let mut accepted: Vec<CandidateRow> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        // Raw rows are retained per partition so the second pass never
        // re-fetches; counters are maintained incrementally across both
        // passes.
        let mut partition_rows: Vec<Vec<CandidateRow>> = Vec::new();
        let mut partition_taken: Vec<u32> = vec![0; plan.partitions.len()];

        // Pass 1: partitions in request order, stopping once the overall
        // budget is spent.
        for (idx, language) in plan.partitions.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let rows = self
                .source
                .fetch(language.as_deref(), request.timeframe)
                .await?;

            for row in &rows {
                if !plan.shared_mode && partition_taken[idx] >= plan.per_language_limit {
                    break;
                }
                let key = identity_key(&row.owner, &row.name);
                if !seen.insert(key) {
                    continue;
                }
                accepted.push(row.clone());
                partition_taken[idx] += 1;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
            partition_rows.push(rows);

            let more_partitions_ahead = idx + 1 < plan.partitions.len();
            if plan.partitions.len() > 1
                && !plan.shared_mode
                && remaining > 0
                && more_partitions_ahead
                && !self.fetch_delay.is_zero()
            {
                tokio::time::sleep(self.fetch_delay).await;
            }
        }

        // Pass 2: refill under-quota partitions from their retained lists.
        // Early partitions can consume identity keys that would otherwise
        // have filled later partitions; this pass hands the leftover budget
        // to partitions still below their cap.
        if remaining > 0 && !plan.shared_mode {
            for (idx, rows) in partition_rows.iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                for row in rows {
                    if partition_taken[idx] >= plan.per_language_limit {
                        break;
                    }
                    let key = identity_key(&row.owner, &row.name);
                    if !seen.insert(key) {
                        continue;
                    }
                    accepted.push(row.clone());
                    partition_taken[idx] += 1;
                    remaining -= 1;
                    if remaining == 0 {
                        break;
                    }
                }
            }
        }

        // Enrichment merge: insertion order defines final rank. Enricher
        // values win when present and non-empty; scraped values otherwise.
        let mut repos: Vec<TrendingRepository> = Vec::with_capacity(accepted.len());
        for row in &accepted {
            if repos.len() as u32 >= plan.overall_limit {
                break;
            }
            let metadata = self.enricher.lookup(&row.owner, &row.name).await;

            let description = metadata
                .as_ref()
                .and_then(|m| m.description.as_deref())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| row.description.clone());
            let repo_url = metadata
                .as_ref()
                .and_then(|m| m.html_url.as_deref())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| row.repo_url.clone());
            let total_stars = metadata
                .as_ref()
                .and_then(|m| m.stargazers_count)
                .or(row.total_stars);
            let forks = metadata
                .as_ref()
                .and_then(|m| m.forks_count)
                .or(row.forks);
            // The page never exposes a last-activity timestamp; this field
            // is enricher-only and stays null when the lookup fails.
            let updated_at = metadata.as_ref().and_then(|m| m.updated_at);

            repos.push(TrendingRepository {
                rank: repos.len() as u32 + 1,
                owner: row.owner.clone(),
                name: row.name.clone(),
                repo_url,
                timeframe: row.timeframe,
                rank_in_context: row.rank_in_context,
                language_context: effective_language(
                    row.language_context.as_deref(),
                    row.primary_language.as_deref(),
                    plan.shared_mode,
                ),
                description,
                primary_language: row.primary_language.clone(),
                total_stars,
                forks,
                stars_in_timeframe: row.stars_in_timeframe,
                timeframe_delta_label: row.timeframe_delta_label.clone(),
                updated_at,
            });
        }

        let metadata = ResponseMetadata {
            timeframe: request.timeframe,
            languages: if plan.normalized_languages.is_empty() {
                vec![GLOBAL_LANGUAGE.to_string()]
            } else {
                plan.normalized_languages.clone()
            },
            retrieved: repos.len(),
            limit_mode: if plan.shared_mode {
                LimitMode::Shared
            } else {
                LimitMode::PerLanguage
            },
            requested_limit: request.limit,
            limit: plan.shared_mode.then_some(plan.per_language_limit),
            limit_per_language: (!plan.shared_mode).then_some(plan.per_language_limit),
            limit_total: (!plan.shared_mode).then_some(plan.intended_total),
            effective_limit: plan.overall_limit,
        };

        info!(
            "Aggregated {} trending repos across {} partition(s) ({})",
            repos.len(),
            plan.partitions.len(),
            request.timeframe
        );

        Ok(TrendingResponse { metadata, repos })
    }

    /// Resolve partitions and quota figures, rejecting uncurated languages
    /// before any fetch starts.
    fn plan(&self, request: &TrendingRequest) -> Result<FetchPlan, AggregateError> {
        if request.limit == 0 {
            return Err(AggregateError::Validation("Limit must be positive".to_string()));
        }
        let per_language_limit = request.limit.min(MAX_LIMIT);

        // One partition per distinct language, in request order.
        let mut normalized_languages: Vec<String> = Vec::new();
        for language in request.languages.iter().map(|l| l.trim().to_lowercase()) {
            if !language.is_empty() && !normalized_languages.contains(&language) {
                normalized_languages.push(language);
            }
        }

        let partitions: Vec<Option<String>> = if normalized_languages.is_empty()
            || normalized_languages.iter().any(|l| l == GLOBAL_LANGUAGE)
        {
            vec![None]
        } else {
            for language in &normalized_languages {
                if !CURATED_LANGUAGES.contains(&language.as_str()) {
                    return Err(AggregateError::Validation(format!(
                        "Language '{language}' is not in the curated supported list"
                    )));
                }
            }
            normalized_languages.iter().cloned().map(Some).collect()
        };

        let shared_mode = partitions.len() == 1 && partitions[0].is_none();
        let partition_count = partitions.len() as u32;
        let intended_total = if shared_mode {
            per_language_limit
        } else {
            per_language_limit * partition_count
        };
        let overall_limit = intended_total.min(if shared_mode {
            MAX_LIMIT
        } else {
            MAX_LIMIT * partition_count
        });

        Ok(FetchPlan {
            partitions,
            normalized_languages,
            shared_mode,
            per_language_limit,
            intended_total,
            overall_limit,
        })
    }
}
