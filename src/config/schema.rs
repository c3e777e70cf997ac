//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files; the
//! route and mock types double as admin API payloads.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Server-side timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Seed gateway routes.
    pub routes: Vec<RouteConfig>,

    /// Seed mock rules for the body-matching table (/mock).
    pub mocks: Vec<MockRuleConfig>,

    /// Seed mock rules for the body-ignoring table (/mock2).
    pub basic_mocks: Vec<BasicMockConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Server-side timeouts. Upstream connect/read timeouts are fixed in the
/// dispatcher; this only bounds the whole inbound request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one inbound request, in seconds. Must leave
    /// room for the longest configured mock delay.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// A gateway route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Source pattern: the path segment matched right after /gateway/.
    pub source_pattern: String,

    /// Base URL the remainder of the path is appended to.
    pub target_base_url: String,

    /// Disabled routes are never eligible for matching.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// A mock rule for the body-matching table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockRuleConfig {
    #[serde(default = "default_method")]
    pub http_method: String,

    /// URL pattern: the full path captured after /mock/.
    pub url_pattern: String,

    /// Expected request body; canonicalized into the rule's fingerprint on
    /// write. Absent means the rule matches bodyless requests only.
    #[serde(default)]
    pub request_payload: Option<String>,

    pub response_payload: String,

    #[serde(default = "default_status")]
    pub http_status_code: u16,

    #[serde(default)]
    pub delay_ms: u64,
}

/// A mock rule for the body-ignoring table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicMockConfig {
    #[serde(default = "default_method")]
    pub http_method: String,

    /// URL pattern: the full path captured after /mock2/.
    pub url_pattern: String,

    pub response_payload: String,

    #[serde(default = "default_status")]
    pub http_status_code: u16,

    #[serde(default)]
    pub delay_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_status() -> u16 {
    200
}
