//! Ant-style path matching and routing for Trellis.
//!
//! This crate provides the [`PathMatcher`] used to select routes and to pull
//! URI template variables out of request paths, plus a small ordered
//! [`Router`] built on top of it.
//!
//! # Pattern Syntax
//!
//! | Pattern | Example match |
//! |---------|---------------|
//! | `/users/*` | `/users/list`, `/users/` |
//! | `/static/**` | `/static`, `/static/css/site.css` |
//! | `/t?st` | `/test`, `/tast` |
//! | `/users/{id}` | `/users/42` (captures `id`) |
//! | `/orders/{id:\d+}` | `/orders/123` only |
//!
//! A pattern and a path must agree on whether they start with `/`, and a
//! trailing `/` is significant unless the pattern ends in `*` or `**`.
//! Matrix parameters (`;jsessionid=...`) are stripped from paths first.
//!
//! # Example
//!
//! ```rust
//! use trellis_router::{MethodRouter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/hotels/{hotel}/bookings", MethodRouter::new().get("bookings#index"));
//! router.insert("/hotels/{hotel}/**", MethodRouter::new().get("hotels#fallback"));
//!
//! let found = router.match_route(&Method::GET, "/hotels/9/bookings").unwrap();
//! assert_eq!(found.route_id, "bookings#index");
//! assert_eq!(found.variables.get("hotel"), Some("9"));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod matcher;
mod method_router;
mod router;
mod variables;

pub use error::MatchError;
pub use matcher::PathMatcher;
pub use method_router::MethodRouter;
pub use router::Router;
pub use variables::PathVariables;

/// A matched route with the variables captured from the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// Identifier registered for the matched method
    pub route_id: &'a str,
    /// The pattern that matched
    pub pattern: &'a str,
    /// Variables captured by `{name}` segments
    pub variables: PathVariables,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route_id: &'a str, pattern: &'a str, variables: PathVariables) -> Self {
        Self {
            route_id,
            pattern,
            variables,
        }
    }
}
