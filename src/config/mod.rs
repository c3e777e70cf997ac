//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated)
//!     → seeds the ConfigStore; server/admin read their sections
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so a minimal config works
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every error, not just the first
//! - Runtime changes go through the admin API, not config reload

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::RouteConfig;
