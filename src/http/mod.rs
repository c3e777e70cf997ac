//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handler dispatch)
//!     → /gateway/* → gateway::router + gateway::dispatch
//!     → /mock/*, /mock2/* → mock::matcher + mock::synth
//!     → error.rs (JSON error envelopes)
//! ```

pub mod error;
pub mod server;

pub use server::{AppState, HttpServer};
