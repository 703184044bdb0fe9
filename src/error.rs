use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

use crate::services::aggregator::AggregateError;
use crate::services::page::FetchError;
use crate::services::validation::ValidationError;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Bad input: unknown timeframe, non-positive limit, unsupported language
    Validation(String),
    /// Trending page fetch failed; fatal for the whole request
    Upstream(String),
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Upstream(msg) => write!(f, "Upstream error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
            meta: ErrorMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        match self {
            Self::Validation(_) => HttpResponse::BadRequest().json(error_response),
            Self::Upstream(_) => HttpResponse::BadGateway().json(error_response),
            Self::Internal(_) => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::Validation(msg) => Self::Validation(msg),
            AggregateError::Fetch(e) => Self::Upstream(e.to_string()),
        }
    }
}
