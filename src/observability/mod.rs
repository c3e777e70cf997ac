//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config, overridable with
//!   RUST_LOG
//! - Metrics are cheap label-tagged counters/histograms, exported over an
//!   optional Prometheus scrape endpoint

pub mod logging;
pub mod metrics;
