//! HTTP method dispatch for a single path pattern.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to route identifiers for one path pattern.
///
/// Any method is accepted, including extension methods such as `PURGE`.
/// Methods are reported back in registration order.
///
/// # Example
///
/// ```rust
/// use trellis_router::MethodRouter;
/// use http::Method;
///
/// let routes = MethodRouter::new()
///     .get("users#index")
///     .post("users#create");
///
/// assert_eq!(routes.route_for(&Method::GET), Some("users#index"));
/// assert_eq!(routes.route_for(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodRouter {
    routes: SmallVec<[(Method, String); 4]>,
}

impl MethodRouter {
    /// Creates a method router with no methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps GET.
    #[must_use]
    pub fn get(self, route_id: impl Into<String>) -> Self {
        self.method(&Method::GET, route_id)
    }

    /// Maps POST.
    #[must_use]
    pub fn post(self, route_id: impl Into<String>) -> Self {
        self.method(&Method::POST, route_id)
    }

    /// Maps PUT.
    #[must_use]
    pub fn put(self, route_id: impl Into<String>) -> Self {
        self.method(&Method::PUT, route_id)
    }

    /// Maps DELETE.
    #[must_use]
    pub fn delete(self, route_id: impl Into<String>) -> Self {
        self.method(&Method::DELETE, route_id)
    }

    /// Maps PATCH.
    #[must_use]
    pub fn patch(self, route_id: impl Into<String>) -> Self {
        self.method(&Method::PATCH, route_id)
    }

    /// Maps an arbitrary method, replacing an earlier mapping for it.
    #[must_use]
    pub fn method(mut self, method: &Method, route_id: impl Into<String>) -> Self {
        let route_id = route_id.into();
        match self.routes.iter_mut().find(|(m, _)| *m == *method) {
            Some(slot) => slot.1 = route_id,
            None => self.routes.push((method.clone(), route_id)),
        }
        self
    }

    /// Returns the route identifier mapped to `method`.
    ///
    /// HEAD falls back to the GET route when it has no mapping of its own.
    #[must_use]
    pub fn route_for(&self, method: &Method) -> Option<&str> {
        self.lookup(method).or_else(|| {
            if *method == Method::HEAD {
                self.lookup(&Method::GET)
            } else {
                None
            }
        })
    }

    fn lookup(&self, method: &Method) -> Option<&str> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, id)| id.as_str())
    }

    /// Adds the methods of `other` that this router does not map yet.
    pub fn merge(&mut self, other: MethodRouter) {
        for (method, route_id) in other.routes {
            if self.lookup(&method).is_none() {
                self.routes.push((method, route_id));
            }
        }
    }

    /// Returns true if at least one method is mapped.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.routes.is_empty()
    }

    /// Returns the mapped methods in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.routes.iter().map(|(m, _)| m.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_empty() {
        let routes = MethodRouter::new();
        assert!(!routes.has_any_method());
        assert!(routes.allowed_methods().is_empty());
        assert_eq!(routes.route_for(&Method::GET), None);
    }

    #[test]
    fn test_method_router_builders() {
        let routes = MethodRouter::new()
            .get("index")
            .post("create")
            .put("replace")
            .patch("update")
            .delete("destroy");

        assert_eq!(routes.route_for(&Method::GET), Some("index"));
        assert_eq!(routes.route_for(&Method::POST), Some("create"));
        assert_eq!(routes.route_for(&Method::PUT), Some("replace"));
        assert_eq!(routes.route_for(&Method::PATCH), Some("update"));
        assert_eq!(routes.route_for(&Method::DELETE), Some("destroy"));
        assert_eq!(
            routes.allowed_methods(),
            vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE
            ]
        );
    }

    #[test]
    fn test_method_router_replaces_mapping() {
        let routes = MethodRouter::new().get("old").get("new");
        assert_eq!(routes.route_for(&Method::GET), Some("new"));
        assert_eq!(routes.allowed_methods().len(), 1);
    }

    #[test]
    fn test_method_router_extension_method() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let routes = MethodRouter::new().method(&purge, "cache#purge");
        assert_eq!(routes.route_for(&purge), Some("cache#purge"));
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let routes = MethodRouter::new().get("show");
        assert_eq!(routes.route_for(&Method::HEAD), Some("show"));

        let routes = MethodRouter::new().get("show").method(&Method::HEAD, "probe");
        assert_eq!(routes.route_for(&Method::HEAD), Some("probe"));
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut routes = MethodRouter::new().get("first");
        routes.merge(MethodRouter::new().get("second").post("create"));

        assert_eq!(routes.route_for(&Method::GET), Some("first"));
        assert_eq!(routes.route_for(&Method::POST), Some("create"));
    }
}
