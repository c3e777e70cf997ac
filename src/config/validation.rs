//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Duplicate detection for route patterns and mock rule keys
//! - Value ranges (status codes) and target URL sanity
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Mock keys are compared after canonicalization, the same way the store
//!   fingerprints them

use std::collections::HashSet;

use url::Url;

use crate::config::schema::AppConfig;
use crate::mock::canonical::canonicalize;

#[derive(Debug)]
pub enum ValidationError {
    EmptySourcePattern,
    SourcePatternHasSlash(String),
    DuplicateSourcePattern(String),
    InvalidTargetBaseUrl { pattern: String, reason: String },
    UnsupportedTargetScheme { pattern: String, scheme: String },
    EmptyUrlPattern { method: String },
    StatusOutOfRange { pattern: String, status: u16 },
    DuplicateMockRule { method: String, pattern: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptySourcePattern => {
                write!(f, "route has an empty source_pattern")
            }
            ValidationError::SourcePatternHasSlash(p) => {
                write!(f, "source_pattern '{}' must be a single path segment", p)
            }
            ValidationError::DuplicateSourcePattern(p) => {
                write!(f, "duplicate source_pattern '{}'", p)
            }
            ValidationError::InvalidTargetBaseUrl { pattern, reason } => {
                write!(f, "route '{}' has an invalid target_base_url: {}", pattern, reason)
            }
            ValidationError::UnsupportedTargetScheme { pattern, scheme } => {
                write!(f, "route '{}' has unsupported scheme '{}'", pattern, scheme)
            }
            ValidationError::EmptyUrlPattern { method } => {
                write!(f, "{} mock rule has an empty url_pattern", method)
            }
            ValidationError::StatusOutOfRange { pattern, status } => {
                write!(f, "mock '{}' has status {} outside 100..=599", pattern, status)
            }
            ValidationError::DuplicateMockRule { method, pattern } => {
                write!(f, "duplicate mock rule for {} '{}'", method, pattern)
            }
        }
    }
}

/// Validate the whole config, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut patterns = HashSet::new();
    for route in &config.routes {
        if route.source_pattern.is_empty() {
            errors.push(ValidationError::EmptySourcePattern);
        } else if route.source_pattern.contains('/') {
            errors.push(ValidationError::SourcePatternHasSlash(
                route.source_pattern.clone(),
            ));
        }
        if !patterns.insert(route.source_pattern.clone()) {
            errors.push(ValidationError::DuplicateSourcePattern(
                route.source_pattern.clone(),
            ));
        }
        match Url::parse(&route.target_base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::UnsupportedTargetScheme {
                pattern: route.source_pattern.clone(),
                scheme: url.scheme().to_string(),
            }),
            Err(e) => errors.push(ValidationError::InvalidTargetBaseUrl {
                pattern: route.source_pattern.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let mut mock_keys = HashSet::new();
    for mock in &config.mocks {
        if mock.url_pattern.is_empty() {
            errors.push(ValidationError::EmptyUrlPattern {
                method: mock.http_method.clone(),
            });
        }
        if !(100..=599).contains(&mock.http_status_code) {
            errors.push(ValidationError::StatusOutOfRange {
                pattern: mock.url_pattern.clone(),
                status: mock.http_status_code,
            });
        }
        let key = (
            mock.http_method.to_uppercase(),
            mock.url_pattern.clone(),
            canonicalize(mock.request_payload.as_deref()),
        );
        if !mock_keys.insert(key) {
            errors.push(ValidationError::DuplicateMockRule {
                method: mock.http_method.to_uppercase(),
                pattern: mock.url_pattern.clone(),
            });
        }
    }

    let mut basic_keys = HashSet::new();
    for mock in &config.basic_mocks {
        if mock.url_pattern.is_empty() {
            errors.push(ValidationError::EmptyUrlPattern {
                method: mock.http_method.clone(),
            });
        }
        if !(100..=599).contains(&mock.http_status_code) {
            errors.push(ValidationError::StatusOutOfRange {
                pattern: mock.url_pattern.clone(),
                status: mock.http_status_code,
            });
        }
        let key = (mock.http_method.to_uppercase(), mock.url_pattern.clone());
        if !basic_keys.insert(key) {
            errors.push(ValidationError::DuplicateMockRule {
                method: mock.http_method.to_uppercase(),
                pattern: mock.url_pattern.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
