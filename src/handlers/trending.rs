//! HTTP handlers for trending aggregation.

use actix_web::{web, HttpResponse};
use std::time::Duration;

use crate::error::AppError;
use crate::models::TrendingQuery;
use crate::services::{language_metadata, validate_inputs, Aggregator};
use crate::AppState;

/// Split a comma-separated language parameter, dropping empty segments.
///
/// `languages=python,go` and `languages=python, go,` both yield
/// `["python", "go"]`; an absent or all-empty value yields `None`.
fn split_languages(raw: Option<&str>) -> Option<Vec<String>> {
    let parts: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// GET /trending
///
/// Aggregate trending repositories across the requested language
/// partitions.
///
/// Query Parameters:
/// - languages: comma-separated curated languages ("all" = no filter)
/// - limit: requested repository count. Default: 10, Max: 100
/// - timeframe: daily, weekly or monthly. Default: daily
pub async fn get_trending(
    state: web::Data<AppState>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse, AppError> {
    let request = validate_inputs(
        split_languages(query.languages.as_deref()),
        query.limit,
        query.timeframe.as_deref(),
    )?;

    let aggregator = Aggregator::new(
        state.source.clone(),
        state.enricher.clone(),
        Duration::from_millis(state.config.fetch_delay_ms),
    );

    let response = aggregator.aggregate(&request).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /languages
///
/// Curated language list plus the default sentinel, for client display.
pub async fn list_languages() -> HttpResponse {
    HttpResponse::Ok().json(language_metadata())
}

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok"
    }))
}

/// Configure trending routes
pub fn configure_trending_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/trending").route(web::get().to(get_trending)))
        .service(web::resource("/languages").route(web::get().to(list_languages)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}
