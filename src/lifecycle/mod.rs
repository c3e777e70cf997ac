//! Process lifecycle coordination.
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown signal out to the server's
//!   graceful-shutdown select and to every in-flight mock delay
//! - Subscribing is cheap; tasks subscribe at the point they need to wait

pub mod shutdown;

pub use shutdown::Shutdown;
