//! Mock-response subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound /mock/{pattern} or /mock2/{pattern}
//!     → canonical.rs (body → fingerprint)
//!     → matcher.rs (rule selection; ambiguity surfaced, never resolved)
//!     → synth.rs (configured delay, status, payload)
//! ```
//!
//! # Design Decisions
//! - /mock matches on (method, pattern, fingerprint) and captures the raw
//!   request body back into the matched rule
//! - /mock2 matches on (method, pattern) only and never reads the body
//! - The delay suspends only the current request's task

pub mod canonical;
pub mod matcher;
pub mod synth;

pub use matcher::{MockError, MockMatcher};
