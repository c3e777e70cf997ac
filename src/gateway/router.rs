//! Route lookup and target URL rewriting.
//!
//! # Responsibilities
//! - Split the captured path into source pattern and remainder
//! - Exact, case-sensitive lookup over enabled routes
//! - Assemble the target URL (base minus one trailing slash, remainder,
//!   original query string)
//!
//! # Design Decisions
//! - Whole-segment equality, no prefix globbing and no regex
//! - Explicit RouteNotFound carrying the pattern, so the 404 body can name it

use std::sync::Arc;

use thiserror::Error;

use crate::store::{ConfigStore, StoredRoute};

/// No enabled route matched the source pattern.
#[derive(Debug, Error)]
#[error("No active gateway configuration found for pattern: {pattern}")]
pub struct RouteNotFound {
    pub pattern: String,
}

/// A resolved route plus the path remainder to forward.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: StoredRoute,
    pub remainder: String,
}

/// Resolves inbound gateway paths against the store.
pub struct GatewayRouter {
    store: Arc<ConfigStore>,
}

impl GatewayRouter {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolve the path captured after `/gateway/`.
    pub fn resolve(&self, captured: &str) -> Result<RouteMatch, RouteNotFound> {
        let (pattern, remainder) = split_source_path(captured);
        match self.store.find_enabled_route(pattern) {
            Some(route) => Ok(RouteMatch {
                route,
                remainder: remainder.to_string(),
            }),
            None => Err(RouteNotFound {
                pattern: pattern.to_string(),
            }),
        }
    }

    /// Rewrite into the upstream URL: target base minus one trailing slash,
    /// then the remainder (with its leading slash, if any), then the
    /// original query string unchanged.
    pub fn target_url(route: &StoredRoute, remainder: &str, query: Option<&str>) -> String {
        let base = route
            .target_base_url
            .strip_suffix('/')
            .unwrap_or(&route.target_base_url);

        let mut url = String::with_capacity(base.len() + remainder.len() + 1);
        url.push_str(base);
        url.push_str(remainder);
        if let Some(query) = query {
            if !query.is_empty() {
                url.push('?');
                url.push_str(query);
            }
        }
        url
    }
}

/// Split at the first slash: the leading segment is the source pattern, the
/// rest (slash included) is forwarded to the upstream.
fn split_source_path(captured: &str) -> (&str, &str) {
    match captured.find('/') {
        Some(idx) => captured.split_at(idx),
        None => (captured, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn store_with(pattern: &str, target: &str, enabled: bool) -> Arc<ConfigStore> {
        let store = Arc::new(ConfigStore::new());
        store
            .insert_route(RouteConfig {
                source_pattern: pattern.to_string(),
                target_base_url: target.to_string(),
                enabled,
                description: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn rewrites_path_and_query() {
        let store = store_with("users", "http://api.internal/v1/", true);
        let router = GatewayRouter::new(store);

        let matched = router.resolve("users/42").unwrap();
        assert_eq!(matched.remainder, "/42");

        let url = GatewayRouter::target_url(&matched.route, &matched.remainder, Some("active=true"));
        assert_eq!(url, "http://api.internal/v1/42?active=true");
    }

    #[test]
    fn bare_pattern_maps_to_bare_base() {
        let store = store_with("users", "http://api.internal/v1", true);
        let router = GatewayRouter::new(store);

        let matched = router.resolve("users").unwrap();
        assert_eq!(matched.remainder, "");
        assert_eq!(
            GatewayRouter::target_url(&matched.route, &matched.remainder, None),
            "http://api.internal/v1"
        );
    }

    #[test]
    fn trailing_slash_is_forwarded() {
        let store = store_with("users", "http://api.internal/v1", true);
        let router = GatewayRouter::new(store);

        let matched = router.resolve("users/").unwrap();
        assert_eq!(matched.remainder, "/");
        assert_eq!(
            GatewayRouter::target_url(&matched.route, &matched.remainder, None),
            "http://api.internal/v1/"
        );
    }

    #[test]
    fn unknown_pattern_names_itself() {
        let store = store_with("users", "http://api.internal/v1", true);
        let router = GatewayRouter::new(store);

        let err = router.resolve("orders/9").unwrap_err();
        assert_eq!(err.pattern, "orders");
        assert!(err.to_string().contains("orders"));
    }

    #[test]
    fn disabled_route_is_not_found() {
        let store = store_with("users", "http://api.internal/v1", false);
        let router = GatewayRouter::new(store);
        assert!(router.resolve("users/42").is_err());
    }

    #[test]
    fn empty_query_is_dropped() {
        let store = store_with("users", "http://api.internal/v1", true);
        let router = GatewayRouter::new(store);

        let matched = router.resolve("users/42").unwrap();
        assert_eq!(
            GatewayRouter::target_url(&matched.route, &matched.remainder, Some("")),
            "http://api.internal/v1/42"
        );
    }
}
