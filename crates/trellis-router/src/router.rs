//! Ordered route table over Ant-style patterns.

use std::sync::Arc;

use http::Method;
use tracing::{debug, warn};

use crate::matcher::PathMatcher;
use crate::method_router::MethodRouter;
use crate::variables::PathVariables;
use crate::RouteMatch;

/// A registered pattern and the methods it serves.
#[derive(Debug, Clone)]
struct Route {
    pattern: String,
    methods: MethodRouter,
}

/// Route table that tries patterns in registration order.
///
/// The first pattern that matches the path *and* maps the request method
/// wins, so more specific patterns should be registered first. Clones share
/// the compiled-segment cache of the underlying [`PathMatcher`].
///
/// # Example
///
/// ```rust
/// use trellis_router::{MethodRouter, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/users/new", MethodRouter::new().get("users#new"));
/// router.insert("/users/{id}", MethodRouter::new().get("users#show"));
///
/// let found = router.match_route(&Method::GET, "/users/42").unwrap();
/// assert_eq!(found.route_id, "users#show");
/// assert_eq!(found.variables.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
    matcher: Arc<PathMatcher>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router with its own path matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_matcher(Arc::new(PathMatcher::new()))
    }

    /// Creates an empty router that uses `matcher`.
    #[must_use]
    pub fn with_matcher(matcher: Arc<PathMatcher>) -> Self {
        Self {
            routes: Vec::new(),
            matcher,
        }
    }

    /// Registers `methods` for `pattern`.
    ///
    /// Registering a pattern a second time adds its unmapped methods to the
    /// existing entry and keeps the entry's original position.
    pub fn insert(&mut self, pattern: &str, methods: MethodRouter) {
        if let Some(route) = self.routes.iter_mut().find(|r| r.pattern == pattern) {
            route.methods.merge(methods);
            return;
        }
        debug!(pattern = %pattern, methods = ?methods.allowed_methods(), "route registered");
        self.routes.push(Route {
            pattern: pattern.to_string(),
            methods,
        });
    }

    /// Registers a single method for `pattern`.
    pub fn route(&mut self, method: &Method, pattern: &str, route_id: impl Into<String>) {
        self.insert(pattern, MethodRouter::new().method(method, route_id));
    }

    /// Finds the first route serving `method` on `path`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| self.matcher.matches(&route.pattern, path))
            .find_map(|route| {
                let route_id = route.methods.route_for(method)?;
                let variables = self.variables(&route.pattern, path)?;
                Some(RouteMatch::new(route_id, &route.pattern, variables))
            })
    }

    /// Finds the first pattern matching `path`, ignoring the method.
    ///
    /// Useful for telling "not found" apart from "method not allowed".
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter, PathVariables)> {
        self.routes
            .iter()
            .filter(|route| self.matcher.matches(&route.pattern, path))
            .find_map(|route| Some((&route.methods, self.variables(&route.pattern, path)?)))
    }

    /// Returns every method served on `path` by any matching pattern.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = Vec::new();
        for route in self
            .routes
            .iter()
            .filter(|route| self.matcher.matches(&route.pattern, path))
        {
            for method in route.methods.allowed_methods() {
                if !allowed.contains(&method) {
                    allowed.push(method);
                }
            }
        }
        allowed
    }

    /// Returns the path matcher shared by this router.
    #[must_use]
    pub fn matcher(&self) -> &Arc<PathMatcher> {
        &self.matcher
    }

    /// Returns the number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no patterns are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn variables(&self, pattern: &str, path: &str) -> Option<PathVariables> {
        match self.matcher.extract_variables(pattern, path) {
            Ok(variables) => Some(variables),
            Err(err) => {
                warn!(pattern = %pattern, path = %path, error = %err, "route variables could not be extracted");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_new() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_match_literal() {
        let mut router = Router::new();
        router.insert("/users", MethodRouter::new().get("users#index"));

        let found = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(found.route_id, "users#index");
        assert_eq!(found.pattern, "/users");
        assert!(found.variables.is_empty());
    }

    #[test]
    fn test_router_match_variables() {
        let mut router = Router::new();
        router.insert(
            "/orgs/{org}/users/{user}",
            MethodRouter::new().get("members#show"),
        );

        let found = router
            .match_route(&Method::GET, "/orgs/acme/users/123")
            .unwrap();
        assert_eq!(found.variables.get("org"), Some("acme"));
        assert_eq!(found.variables.get("user"), Some("123"));
    }

    #[test]
    fn test_router_registration_order_wins() {
        let mut router = Router::new();
        router.insert("/users/me", MethodRouter::new().get("users#current"));
        router.insert("/users/{id}", MethodRouter::new().get("users#show"));

        let found = router.match_route(&Method::GET, "/users/me").unwrap();
        assert_eq!(found.route_id, "users#current");

        let found = router.match_route(&Method::GET, "/users/7").unwrap();
        assert_eq!(found.route_id, "users#show");
    }

    #[test]
    fn test_router_skips_patterns_without_method() {
        let mut router = Router::new();
        router.insert("/users/{id}", MethodRouter::new().get("users#show"));
        router.insert("/users/**", MethodRouter::new().delete("users#purge"));

        let found = router.match_route(&Method::DELETE, "/users/7").unwrap();
        assert_eq!(found.route_id, "users#purge");
        assert!(found.variables.is_empty());
    }

    #[test]
    fn test_router_method_not_allowed() {
        let mut router = Router::new();
        router.insert("/users", MethodRouter::new().get("users#index"));

        assert!(router.match_route(&Method::POST, "/users").is_none());
        assert!(router.match_path("/users").is_some());
        assert_eq!(router.allowed_methods("/users"), vec![Method::GET]);
        assert!(router.allowed_methods("/posts").is_empty());
    }

    #[test]
    fn test_router_insert_merges_same_pattern() {
        let mut router = Router::new();
        router.route(&Method::GET, "/items", "items#index");
        router.route(&Method::POST, "/items", "items#create");

        assert_eq!(router.len(), 1);
        assert_eq!(
            router.match_route(&Method::POST, "/items").map(|m| m.route_id),
            Some("items#create")
        );
    }

    #[test]
    fn test_router_wildcards() {
        let mut router = Router::new();
        router.insert("/assets/**/*.css", MethodRouter::new().get("assets#css"));

        assert!(router
            .match_route(&Method::GET, "/assets/themes/dark/site.css")
            .is_some());
        assert!(router
            .match_route(&Method::GET, "/assets/themes/dark/site.js")
            .is_none());
    }

    #[test]
    fn test_router_clones_share_matcher() {
        let mut router = Router::new();
        router.insert("/users/{id}", MethodRouter::new().get("users#show"));
        let cloned = router.clone();

        assert!(cloned.match_route(&Method::GET, "/users/1").is_some());
        assert!(Arc::ptr_eq(router.matcher(), cloned.matcher()));
        assert!(router.matcher().cached_segments() > 0);
    }

    #[test]
    fn test_router_root() {
        let mut router = Router::new();
        router.insert("/", MethodRouter::new().get("home"));

        assert_eq!(
            router.match_route(&Method::GET, "/").map(|m| m.route_id),
            Some("home")
        );
    }
}
