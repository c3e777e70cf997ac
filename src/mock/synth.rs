//! Mock response synthesis.
//!
//! # Responsibilities
//! - Apply the rule's configured delay before answering
//! - Return the configured status code and payload verbatim
//!
//! # Design Decisions
//! - The delay suspends only this request's task and holds no lock
//! - A delay cut short by shutdown is a distinct failure, not a skipped wait

use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};

use crate::lifecycle::Shutdown;
use crate::mock::matcher::MockError;
use crate::store::MockRule;

/// Build the response for a matched rule, waiting out its delay first.
pub async fn synthesize(rule: &MockRule, shutdown: &Shutdown) -> Result<Response<Body>, MockError> {
    if rule.delay_ms > 0 {
        tracing::info!(
            delay_ms = rule.delay_ms,
            method = %rule.http_method,
            pattern = %rule.url_pattern,
            "Delaying mock response"
        );
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(rule.delay_ms)) => {}
            _ = shutdown.wait() => return Err(MockError::DelayInterrupted),
        }
    }

    tracing::info!(
        status = rule.http_status_code,
        method = %rule.http_method,
        pattern = %rule.url_pattern,
        "Returning mock response"
    );

    // The store's write path keeps status codes inside 100..=599.
    let status = StatusCode::from_u16(rule.http_status_code).unwrap_or(StatusCode::OK);
    let mut response = Response::new(Body::from(rule.response_payload.clone()));
    *response.status_mut() = status;
    Ok(response)
}
