//! Input validation shared by the HTTP handlers and the CLI.
//!
//! All checks run before any fetch work starts; a failure means no partial
//! aggregation was performed.

use thiserror::Error;

use crate::constants::{CURATED_LANGUAGES, DEFAULT_LIMIT, GLOBAL_LANGUAGE, MAX_LIMIT};
use crate::models::{LanguageMetadata, Timeframe, TrendingRequest};

/// Errors raised while validating caller input
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Limit must be positive")]
    NonPositiveLimit,

    #[error("Limit cannot exceed {MAX_LIMIT}")]
    LimitTooLarge,

    #[error("{0}")]
    InvalidTimeframe(String),

    #[error("Language '{0}' is not in the curated supported list")]
    UnsupportedLanguage(String),
}

/// Validate languages/limit/timeframe and produce a `TrendingRequest`.
///
/// Languages are trimmed, lowercased and stripped of empty entries before
/// the curated-list check; `"all"` always passes.
pub fn validate_inputs(
    languages: Option<Vec<String>>,
    limit: Option<u32>,
    timeframe: Option<&str>,
) -> Result<TrendingRequest, ValidationError> {
    let cleaned: Vec<String> = languages
        .unwrap_or_default()
        .iter()
        .map(|language| language.trim().to_lowercase())
        .filter(|language| !language.is_empty())
        .collect();

    if let Some(limit) = limit {
        if limit == 0 {
            return Err(ValidationError::NonPositiveLimit);
        }
        if limit > MAX_LIMIT {
            return Err(ValidationError::LimitTooLarge);
        }
    }

    let timeframe = match timeframe {
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse::<Timeframe>()
            .map_err(ValidationError::InvalidTimeframe)?,
        None => Timeframe::default(),
    };

    for language in &cleaned {
        if language != GLOBAL_LANGUAGE && !CURATED_LANGUAGES.contains(&language.as_str()) {
            return Err(ValidationError::UnsupportedLanguage(language.clone()));
        }
    }

    Ok(TrendingRequest {
        languages: cleaned,
        limit: limit.unwrap_or(DEFAULT_LIMIT),
        timeframe,
    })
}

/// Language defaults and the supported list, for client display.
pub fn language_metadata() -> LanguageMetadata {
    LanguageMetadata {
        default: GLOBAL_LANGUAGE.to_string(),
        supported: CURATED_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        notes: "When no language is supplied the server queries for all languages.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let request = validate_inputs(None, None, None).unwrap();
        assert!(request.languages.is_empty());
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert_eq!(request.timeframe, Timeframe::Daily);
    }

    #[test]
    fn languages_are_normalized() {
        let request = validate_inputs(
            Some(vec![" Rust ".to_string(), "".to_string(), "GO".to_string()]),
            Some(5),
            Some("weekly"),
        )
        .unwrap();
        assert_eq!(request.languages, vec!["rust", "go"]);
        assert_eq!(request.timeframe, Timeframe::Weekly);
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(matches!(
            validate_inputs(None, Some(0), None),
            Err(ValidationError::NonPositiveLimit)
        ));
    }

    #[test]
    fn oversized_limit_is_rejected() {
        assert!(matches!(
            validate_inputs(None, Some(MAX_LIMIT + 1), None),
            Err(ValidationError::LimitTooLarge)
        ));
    }

    #[test]
    fn unknown_timeframe_is_rejected() {
        assert!(matches!(
            validate_inputs(None, None, Some("yearly")),
            Err(ValidationError::InvalidTimeframe(_))
        ));
    }

    #[test]
    fn uncurated_language_is_rejected() {
        let err = validate_inputs(Some(vec!["brainfuck".to_string()]), None, None).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedLanguage(l) if l == "brainfuck"));
    }

    #[test]
    fn global_sentinel_is_always_accepted() {
        let request = validate_inputs(Some(vec!["all".to_string()]), None, None).unwrap();
        assert_eq!(request.languages, vec!["all"]);
    }

    #[test]
    fn language_metadata_lists_curated_languages() {
        let meta = language_metadata();
        assert_eq!(meta.default, "all");
        assert!(meta.supported.contains(&"rust".to_string()));
        assert_eq!(meta.supported.len(), CURATED_LANGUAGES.len());
    }
}
