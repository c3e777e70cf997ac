//! Mock gateway: reverse proxy with a full audit trail, plus configurable
//! mock responses matched by method, path and canonicalized request body.

pub mod admin;
pub mod audit;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod store;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::ConfigStore;
