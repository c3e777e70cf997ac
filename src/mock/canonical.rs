//! JSON canonicalization for mock lookup keys.
//!
//! # Responsibilities
//! - Reduce a request payload to a deterministic minimal form
//! - Treat absent/blank payloads as "no body expected"
//! - Degrade gracefully on malformed input (matching stays approximate,
//!   the request is never rejected)
//!
//! # Design Decisions
//! - Key order is the parser's order, not sorted (serde_json `preserve_order`)
//! - Whitespace outside quoted string literals is stripped by a char scan,
//!   so escaped quotes inside strings are handled correctly
//! - Canonicalization is idempotent

/// Canonicalize a payload into its fingerprint form.
///
/// `None` or a blank string yields `None`: a `None` fingerprint means the
/// rule expects no body at all. Valid JSON is re-serialized with no
/// insignificant whitespace. Anything else comes back with unquoted
/// whitespace stripped; this function never fails.
pub fn canonicalize(input: Option<&str>) -> Option<String> {
    let raw = input?;
    if raw.trim().is_empty() {
        return None;
    }

    let stripped = strip_unquoted_whitespace(raw);
    match serde_json::from_str::<serde_json::Value>(&stripped) {
        Ok(value) => Some(value.to_string()),
        Err(error) => {
            tracing::warn!(%error, "payload is not valid JSON, falling back to stripped form");
            Some(stripped)
        }
    }
}

/// Remove every whitespace character that is not inside a quoted string
/// literal. Quote state tracks backslash escapes, so `"a \" b"` stays intact.
fn strip_unquoted_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if !c.is_whitespace() {
            out.push(c);
        }
    }

    out
}
