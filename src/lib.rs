//! GitHub Trending aggregation server.
//!
//! Scrapes the trending page per language partition, deduplicates and
//! quota-fills the listings into one globally ranked set, and enriches each
//! surviving repository from the GitHub REST API.

use std::sync::Arc;

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;

pub use models::{
    CandidateRow, LanguageMetadata, LimitMode, RepoMetadata, ResponseMetadata, Timeframe,
    TrendingQuery, TrendingRepository, TrendingRequest, TrendingResponse,
};

pub use services::{
    Aggregator, FetchError, GitHubApiClient, MetadataEnricher, RowSource, TrendingPageClient,
    ValidationError,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub source: Arc<dyn RowSource>,
    pub enricher: Arc<dyn MetadataEnricher>,
}
