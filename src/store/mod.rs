//! Route and mock-rule store.
//!
//! # Data Flow
//! ```text
//! Seed config (TOML) ──▶ ConfigStore::from_config
//! Admin API ───────────▶ insert/update/delete (write path enforces invariants)
//! Gateway lookup ──────▶ find_enabled_route (exact source pattern)
//! Mock lookup ─────────▶ mock_candidates / basic_candidates
//! ```
//!
//! # Design Decisions
//! - Routes are keyed by source pattern, so pattern uniqueness is enforced
//!   structurally instead of by a relational constraint
//! - Mock rules are bucketed per (method, pattern); the write path rejects a
//!   second bodyless rule or a duplicate fingerprint in a bucket
//! - HTTP methods are normalized to uppercase on write and lookup; URL
//!   patterns stay case-sensitive
//! - Reads clone small rows out of the map, so no lock is held across awaits

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use crate::config::schema::{BasicMockConfig, MockRuleConfig, RouteConfig};
use crate::mock::canonical::canonicalize;

/// Errors surfaced by the store's write path.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("route source pattern '{0}' already exists")]
    DuplicateSourcePattern(String),

    #[error("mock rule for {method} {pattern} with the same request fingerprint already exists")]
    DuplicateMockRule { method: String, pattern: String },

    #[error("http status code {0} is outside 100..=599")]
    StatusOutOfRange(u16),

    #[error("no route with id {0}")]
    UnknownRoute(u64),

    #[error("no mock rule with id {0}")]
    UnknownMock(u64),
}

/// A gateway route as held by the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRoute {
    pub id: u64,
    pub source_pattern: String,
    pub target_base_url: String,
    pub enabled: bool,
    pub description: Option<String>,
}

/// A mock rule as held by the store.
///
/// `fingerprint` is the canonicalized expected request body; `None` means the
/// rule only matches requests without a body. Rules in the body-ignoring
/// table always carry `None`.
#[derive(Debug, Clone, Serialize)]
pub struct MockRule {
    pub id: u64,
    pub http_method: String,
    pub url_pattern: String,
    pub fingerprint: Option<String>,
    pub response_payload: String,
    pub http_status_code: u16,
    pub delay_ms: u64,
    pub captured_request_payload: Option<String>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct MockScope {
    method: String,
    pattern: String,
}

impl MockScope {
    fn new(method: &str, pattern: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            pattern: pattern.to_string(),
        }
    }
}

/// Shared store of routes and mock rules.
pub struct ConfigStore {
    next_id: AtomicU64,
    routes: DashMap<String, StoredRoute>,
    mocks: DashMap<MockScope, Vec<MockRule>>,
    basic_mocks: DashMap<MockScope, Vec<MockRule>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            routes: DashMap::new(),
            mocks: DashMap::new(),
            basic_mocks: DashMap::new(),
        }
    }

    /// Build a store seeded from the loaded configuration.
    pub fn from_config(
        routes: &[RouteConfig],
        mocks: &[MockRuleConfig],
        basic_mocks: &[BasicMockConfig],
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for route in routes {
            store.insert_route(route.clone())?;
        }
        for mock in mocks {
            store.insert_mock(mock.clone())?;
        }
        for mock in basic_mocks {
            store.insert_basic_mock(mock.clone())?;
        }
        Ok(store)
    }

    fn alloc_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // --- Routes ---

    pub fn insert_route(&self, config: RouteConfig) -> Result<StoredRoute, StoreError> {
        match self.routes.entry(config.source_pattern.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateSourcePattern(config.source_pattern))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let route = StoredRoute {
                    id: self.alloc_id(),
                    source_pattern: config.source_pattern,
                    target_base_url: config.target_base_url,
                    enabled: config.enabled,
                    description: config.description,
                };
                entry.insert(route.clone());
                Ok(route)
            }
        }
    }

    pub fn update_route(&self, id: u64, config: RouteConfig) -> Result<StoredRoute, StoreError> {
        let existing = self.route_by_id(id).ok_or(StoreError::UnknownRoute(id))?;
        if config.source_pattern != existing.source_pattern
            && self.routes.contains_key(&config.source_pattern)
        {
            return Err(StoreError::DuplicateSourcePattern(config.source_pattern));
        }

        self.routes.remove(&existing.source_pattern);
        let route = StoredRoute {
            id,
            source_pattern: config.source_pattern,
            target_base_url: config.target_base_url,
            enabled: config.enabled,
            description: config.description,
        };
        self.routes.insert(route.source_pattern.clone(), route.clone());
        Ok(route)
    }

    pub fn delete_route(&self, id: u64) -> Result<StoredRoute, StoreError> {
        let existing = self.route_by_id(id).ok_or(StoreError::UnknownRoute(id))?;
        self.routes
            .remove(&existing.source_pattern)
            .map(|(_, route)| route)
            .ok_or(StoreError::UnknownRoute(id))
    }

    pub fn routes(&self) -> Vec<StoredRoute> {
        let mut all: Vec<StoredRoute> = self.routes.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub fn route_by_id(&self, id: u64) -> Option<StoredRoute> {
        self.routes
            .iter()
            .find(|r| r.value().id == id)
            .map(|r| r.value().clone())
    }

    /// Exact, case-sensitive lookup over enabled routes only.
    pub fn find_enabled_route(&self, source_pattern: &str) -> Option<StoredRoute> {
        self.routes
            .get(source_pattern)
            .filter(|r| r.enabled)
            .map(|r| r.value().clone())
    }

    // --- Mock rules (body-matching table) ---

    pub fn insert_mock(&self, config: MockRuleConfig) -> Result<MockRule, StoreError> {
        check_status(config.http_status_code)?;
        let scope = MockScope::new(&config.http_method, &config.url_pattern);
        let fingerprint = canonicalize(config.request_payload.as_deref());

        let mut bucket = self.mocks.entry(scope.clone()).or_default();
        if bucket.iter().any(|rule| rule.fingerprint == fingerprint) {
            return Err(StoreError::DuplicateMockRule {
                method: scope.method,
                pattern: scope.pattern,
            });
        }

        let rule = MockRule {
            id: self.alloc_id(),
            http_method: scope.method.clone(),
            url_pattern: scope.pattern.clone(),
            fingerprint,
            response_payload: config.response_payload,
            http_status_code: config.http_status_code,
            delay_ms: config.delay_ms,
            captured_request_payload: None,
        };
        bucket.push(rule.clone());
        Ok(rule)
    }

    pub fn delete_mock(&self, id: u64) -> Result<MockRule, StoreError> {
        remove_rule(&self.mocks, id)
    }

    pub fn mocks(&self) -> Vec<MockRule> {
        collect_rules(&self.mocks)
    }

    /// All rules registered for (method, pattern); the matcher selects among
    /// them by fingerprint.
    pub fn mock_candidates(&self, method: &str, pattern: &str) -> Vec<MockRule> {
        self.mocks
            .get(&MockScope::new(method, pattern))
            .map(|bucket| bucket.clone())
            .unwrap_or_default()
    }

    /// Write back the last request body seen by a body-matching rule.
    pub fn capture_payload(&self, id: u64, raw_body: &str) -> Result<(), StoreError> {
        for mut bucket in self.mocks.iter_mut() {
            if let Some(rule) = bucket.value_mut().iter_mut().find(|r| r.id == id) {
                rule.captured_request_payload = Some(raw_body.to_string());
                return Ok(());
            }
        }
        Err(StoreError::UnknownMock(id))
    }

    // --- Mock rules (body-ignoring table) ---

    pub fn insert_basic_mock(&self, config: BasicMockConfig) -> Result<MockRule, StoreError> {
        check_status(config.http_status_code)?;
        let scope = MockScope::new(&config.http_method, &config.url_pattern);

        let mut bucket = self.basic_mocks.entry(scope.clone()).or_default();
        if !bucket.is_empty() {
            return Err(StoreError::DuplicateMockRule {
                method: scope.method,
                pattern: scope.pattern,
            });
        }

        let rule = MockRule {
            id: self.alloc_id(),
            http_method: scope.method.clone(),
            url_pattern: scope.pattern.clone(),
            fingerprint: None,
            response_payload: config.response_payload,
            http_status_code: config.http_status_code,
            delay_ms: config.delay_ms,
            captured_request_payload: None,
        };
        bucket.push(rule.clone());
        Ok(rule)
    }

    pub fn delete_basic_mock(&self, id: u64) -> Result<MockRule, StoreError> {
        remove_rule(&self.basic_mocks, id)
    }

    pub fn basic_mocks(&self) -> Vec<MockRule> {
        collect_rules(&self.basic_mocks)
    }

    pub fn basic_candidates(&self, method: &str, pattern: &str) -> Vec<MockRule> {
        self.basic_mocks
            .get(&MockScope::new(method, pattern))
            .map(|bucket| bucket.clone())
            .unwrap_or_default()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_status(status: u16) -> Result<(), StoreError> {
    if (100..=599).contains(&status) {
        Ok(())
    } else {
        Err(StoreError::StatusOutOfRange(status))
    }
}

fn collect_rules(table: &DashMap<MockScope, Vec<MockRule>>) -> Vec<MockRule> {
    let mut all: Vec<MockRule> = table
        .iter()
        .flat_map(|bucket| bucket.value().clone())
        .collect();
    all.sort_by_key(|r| r.id);
    all
}

fn remove_rule(table: &DashMap<MockScope, Vec<MockRule>>, id: u64) -> Result<MockRule, StoreError> {
    for mut bucket in table.iter_mut() {
        if let Some(pos) = bucket.value().iter().position(|r| r.id == id) {
            return Ok(bucket.value_mut().remove(pos));
        }
    }
    Err(StoreError::UnknownMock(id))
}
