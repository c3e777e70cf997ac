//! Mock rule matching.
//!
//! # Responsibilities
//! - Canonicalize the request body into a fingerprint
//! - Select the single rule matching (method, pattern, fingerprint)
//! - Surface ambiguity distinctly instead of picking by storage order
//! - Write the raw request body back into the matched rule
//!
//! # Design Decisions
//! - A rule without a fingerprint matches only bodyless requests; a request
//!   with a body consults fingerprint rules only, so the two kinds never
//!   compete
//! - The write path already rejects duplicate keys; the matcher still
//!   refuses multi-candidate sets in case seeded data bypassed it

use std::sync::Arc;

use thiserror::Error;

use crate::mock::canonical::canonicalize;
use crate::store::{ConfigStore, MockRule};

/// Failures in the mock path.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("No mock configuration found for method '{method}' and URL pattern '{pattern}'")]
    NotFound { method: String, pattern: String },

    #[error(
        "{count} mock rules match method '{method}' and URL pattern '{pattern}'; \
         refusing to pick one"
    )]
    AmbiguousMock {
        method: String,
        pattern: String,
        count: usize,
    },

    #[error("response delay was interrupted by shutdown")]
    DelayInterrupted,
}

/// Resolves inbound mock requests against the store.
pub struct MockMatcher {
    store: Arc<ConfigStore>,
}

impl MockMatcher {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolve against the body-matching table and capture the raw body
    /// into the matched rule.
    pub fn resolve(
        &self,
        method: &str,
        pattern: &str,
        raw_body: Option<&str>,
    ) -> Result<MockRule, MockError> {
        let fingerprint = canonicalize(raw_body);
        let candidates = self.store.mock_candidates(method, pattern);
        let rule = select_rule(candidates, fingerprint.as_deref(), method, pattern)?;

        if let Some(body) = raw_body.filter(|b| !b.trim().is_empty()) {
            // The rule was just matched, so the id is live; a concurrent
            // delete loses the capture, nothing else.
            let _ = self.store.capture_payload(rule.id, body);
        }
        Ok(rule)
    }

    /// Resolve against the body-ignoring table.
    pub fn resolve_basic(&self, method: &str, pattern: &str) -> Result<MockRule, MockError> {
        let candidates = self.store.basic_candidates(method, pattern);
        select_rule(candidates, None, method, pattern)
    }
}

/// Pure selection step: exact fingerprint equality, one winner required.
fn select_rule(
    candidates: Vec<MockRule>,
    fingerprint: Option<&str>,
    method: &str,
    pattern: &str,
) -> Result<MockRule, MockError> {
    let mut matches: Vec<MockRule> = candidates
        .into_iter()
        .filter(|rule| rule.fingerprint.as_deref() == fingerprint)
        .collect();

    match matches.len() {
        0 => Err(MockError::NotFound {
            method: method.to_string(),
            pattern: pattern.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(MockError::AmbiguousMock {
            method: method.to_string(),
            pattern: pattern.to_string(),
            count,
        }),
    }
}
