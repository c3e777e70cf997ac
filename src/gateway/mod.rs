//! Gateway (reverse-proxy) subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound /gateway/{pattern}/rest?query
//!     → router.rs (exact enabled-only pattern lookup, target URL rewrite)
//!     → dispatch.rs (one outbound call, header hygiene, timeouts)
//!     → audit::ExchangeLogger (exactly one record per request)
//! ```
//!
//! # Design Decisions
//! - The source pattern is the first path segment after /gateway/; the
//!   remainder and query string pass through verbatim
//! - No retries, no redirect following; a 3xx is the caller's to handle
//! - Failures still answer the client and still produce an audit record

pub mod dispatch;
pub mod router;

pub use dispatch::ProxyDispatcher;
pub use router::{GatewayRouter, RouteMatch, RouteNotFound};
