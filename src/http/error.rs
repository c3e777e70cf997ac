//! JSON error envelopes for the request boundary.
//!
//! Every failure that reaches a client becomes a JSON body; errors are never
//! allowed to escape as bare status codes or panics.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

/// `{"error": "..."}` with the given status.
pub fn json_error(status: StatusCode, message: impl AsRef<str>) -> Response<Body> {
    json_response(status, serde_json::json!({ "error": message.as_ref() }))
}

/// The dispatch failure envelope: status 500 with the error detail.
pub fn gateway_failure(details: &str) -> Response<Body> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({
            "error": "Gateway failed to process request.",
            "details": details,
        }),
    )
}

fn json_response(status: StatusCode, payload: serde_json::Value) -> Response<Body> {
    let mut response = Response::new(Body::from(payload.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
