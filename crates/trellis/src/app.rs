//! The application object tying routing, parsing, binding and validation together.

use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use tracing::debug;
use trellis_binding::Binder;
use trellis_config::TrellisConfig;
use trellis_core::{Bean, Errors, MapMessageSource, MessageSource};
use trellis_params::{ParamsResult, ParseOptions, Params};
use trellis_router::{MethodRouter, PathMatcher, PathVariables, RouteMatch, Router};
use trellis_telemetry::metrics::record_bind_request;
use trellis_telemetry::TelemetryResult;
use trellis_validation::{ValidationResult, Validator};

/// One request's trip through the framework:
/// route → parameters → bind → validate → messages.
///
/// Converters and constraints are registered on [`binder`](Self::binder)
/// and [`validator`](Self::validator); both take `&self`, so a built
/// `Trellis` can be shared across threads.
///
/// ```rust,ignore
/// let app = Trellis::builder()
///     .route("/people/{id}", MethodRouter::new().post("people#update"))
///     .build();
/// app.validator().register::<Person>(constraints)?;
///
/// let found = app.route(&Method::POST, "/people/7").unwrap();
/// let params = app.params(&found.variables, request_params)?;
/// let mut person = Person::default();
/// let errors = app.bind(&mut person, &params)?;
/// let rendered = app.messages(&errors, None);
/// ```
pub struct Trellis {
    config: TrellisConfig,
    router: Router,
    binder: Binder,
    validator: Validator,
    messages: Arc<dyn MessageSource>,
    parse_options: ParseOptions,
}

impl std::fmt::Debug for Trellis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trellis")
            .field("config", &self.config)
            .field("routes", &self.router.len())
            .field("binder", &self.binder)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl Default for Trellis {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Trellis {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn builder() -> TrellisBuilder {
        TrellisBuilder::new(TrellisConfig::default())
    }

    /// Creates a builder from a loaded configuration.
    #[must_use]
    pub fn from_config(config: TrellisConfig) -> TrellisBuilder {
        TrellisBuilder::new(config)
    }

    /// The configuration this instance was built from.
    #[must_use]
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// The converter registry.
    #[must_use]
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// The constraint registry.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The route table.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Installs the global log subscriber described by the `logging` section.
    pub fn init_logging(&self) -> TelemetryResult<()> {
        trellis_telemetry::init_logging(&self.config.logging.to_log_config())
    }

    /// Finds the first route serving `method` on `path`.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.router.match_route(method, path)
    }

    /// Builds the parameter tree of a request.
    ///
    /// Path variables go in first, then the request parameters in order;
    /// a key seen twice keeps its first value. With `params.trim_values`
    /// every value is trimmed afterwards.
    ///
    /// # Errors
    ///
    /// Returns the parse error of the first malformed key.
    pub fn params<I, K, VS, V>(&self, path_variables: &PathVariables, request: I) -> ParamsResult<Params>
    where
        I: IntoIterator<Item = (K, VS)>,
        K: AsRef<str>,
        VS: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(String, Vec<String>)> = path_variables
            .iter()
            .map(|(name, value)| (name.to_string(), vec![value.to_string()]))
            .collect();
        pairs.extend(request.into_iter().map(|(key, values)| {
            (
                key.as_ref().to_string(),
                values.into_iter().map(|v| v.as_ref().to_string()).collect(),
            )
        }));

        let params = Params::parse_map_with(pairs, self.parse_options)?;
        Ok(if self.config.params.trim_values {
            params.trim()
        } else {
            params
        })
    }

    /// Binds `params` onto `target`, then validates it if its type has
    /// registered constraints.
    ///
    /// Binding errors win: validation errors are only kept for paths the
    /// binder had nothing to say about.
    ///
    /// # Errors
    ///
    /// Returns a validator configuration error, e.g. a nested bean type
    /// reached by `valid` without registered constraints.
    pub fn bind(&self, target: &mut dyn Bean, params: &Params) -> ValidationResult<Errors> {
        let bean_type = target.bean_type();
        let mut errors = self.binder.bind(target, params);
        let binding_errors = errors.error_count();

        if self.validator.is_registered_type(bean_type) {
            errors.merge(self.validator.validate(&*target)?);
        }

        let name = bean_type.simple_name();
        debug!(
            bean_type = %name,
            binding_errors,
            error_count = errors.error_count(),
            "bind request"
        );
        record_bind_request(&name, errors.is_empty());
        Ok(errors)
    }

    /// Renders `errors` in `locale`, or the configured default locale.
    #[must_use]
    pub fn messages(&self, errors: &Errors, locale: Option<&str>) -> IndexMap<String, Vec<String>> {
        let locale = locale.unwrap_or(&self.config.messages.default_locale);
        errors.messages(self.messages.as_ref(), locale)
    }
}

/// Builder for [`Trellis`].
pub struct TrellisBuilder {
    config: TrellisConfig,
    routes: Vec<(String, MethodRouter)>,
    binder: Option<Binder>,
    validator: Option<Validator>,
    messages: Option<Arc<dyn MessageSource>>,
}

impl TrellisBuilder {
    /// Creates a builder from `config`.
    #[must_use]
    pub fn new(config: TrellisConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            binder: None,
            validator: None,
            messages: None,
        }
    }

    /// Registers `methods` for a path pattern; earlier routes win.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, methods: MethodRouter) -> Self {
        self.routes.push((pattern.into(), methods));
        self
    }

    /// Uses a prepared binder instead of one with the built-in converters.
    #[must_use]
    pub fn binder(mut self, binder: Binder) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Uses a prepared validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Uses `source` to render messages; the default has no templates, so
    /// messages fall back to their keys.
    #[must_use]
    pub fn messages(mut self, source: impl MessageSource + 'static) -> Self {
        self.messages = Some(Arc::new(source));
        self
    }

    /// Builds the application.
    #[must_use]
    pub fn build(self) -> Trellis {
        let matcher = PathMatcher::new().with_trim_tokens(self.config.router.trim_tokens);
        let mut router = Router::with_matcher(Arc::new(matcher));
        for (pattern, methods) in self.routes {
            router.insert(&pattern, methods);
        }

        Trellis {
            parse_options: ParseOptions::default().with_max_index(self.config.params.max_index),
            router,
            binder: self.binder.unwrap_or_default(),
            validator: self.validator.unwrap_or_default(),
            messages: self
                .messages
                .unwrap_or_else(|| Arc::new(MapMessageSource::new())),
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::{ParamsConfig, RouterConfig};
    use trellis_params::ParamValue;

    fn no_request() -> Vec<(&'static str, Vec<&'static str>)> {
        Vec::new()
    }

    #[test]
    fn test_route_uses_first_match() {
        let app = Trellis::builder()
            .route("/people/{id}", MethodRouter::new().get("people#show"))
            .route("/people/**", MethodRouter::new().get("people#any"))
            .build();

        let found = app.route(&Method::GET, "/people/7").unwrap();
        assert_eq!(found.route_id, "people#show");
        assert_eq!(found.variables.get("id"), Some("7"));
        assert_eq!(app.route(&Method::GET, "/people/7/x").unwrap().route_id, "people#any");
        assert!(app.route(&Method::POST, "/people/7").is_none());
    }

    #[test]
    fn test_router_honours_trim_tokens() {
        let config = TrellisConfig::builder()
            .router(RouterConfig { trim_tokens: false })
            .build();
        let app = Trellis::from_config(config)
            .route("/a/b", MethodRouter::new().get("ab"))
            .build();
        assert!(app.route(&Method::GET, "/a/ b").is_none());

        let app = Trellis::builder()
            .route("/a/b", MethodRouter::new().get("ab"))
            .build();
        assert!(app.route(&Method::GET, "/a/ b").is_some());
    }

    #[test]
    fn test_path_variables_come_first() {
        let app = Trellis::default();
        let variables: PathVariables = [("id", "7")].into_iter().collect();
        let params = app
            .params(&variables, vec![("id", vec!["99"]), ("name", vec!["Ada"])])
            .unwrap();
        assert_eq!(params.get("id").and_then(ParamValue::as_text), Some("7"));
        assert_eq!(params.get("name").and_then(ParamValue::as_text), Some("Ada"));
    }

    #[test]
    fn test_params_max_index_from_config() {
        let config = TrellisConfig::builder()
            .params(ParamsConfig {
                max_index: 5,
                trim_values: false,
            })
            .build();
        let app = Trellis::from_config(config).build();
        let err = app
            .params(&PathVariables::new(), vec![("rows[6]", vec!["x"])])
            .unwrap_err();
        assert!(err.is_parse_error());
        assert!(app
            .params(&PathVariables::new(), vec![("rows[5]", vec!["x"])])
            .is_ok());
    }

    #[test]
    fn test_params_trim_values() {
        let app = Trellis::from_config(TrellisConfig::production()).build();
        let params = app
            .params(&PathVariables::new(), vec![("name", vec!["  Ada "])])
            .unwrap();
        assert_eq!(params.get("name").and_then(ParamValue::as_text), Some("Ada"));

        let params = Trellis::default()
            .params(&PathVariables::new(), vec![("name", vec!["  Ada "])])
            .unwrap();
        assert_eq!(params.get("name").and_then(ParamValue::as_text), Some("  Ada "));
    }

    #[test]
    fn test_empty_request() {
        let app = Trellis::default();
        assert!(app.params(&PathVariables::new(), no_request()).unwrap().is_empty());
    }

    #[test]
    fn test_messages_default_locale() {
        let source = MapMessageSource::new()
            .with_message("en", "notNull", "required")
            .with_message("de", "notNull", "erforderlich");
        let app = Trellis::builder().messages(source).build();

        let mut errors = Errors::new();
        errors.add(trellis_core::PropertyError::new(
            trellis_core::TypeInfo::of::<u8>(),
            trellis_core::TypeInfo::of::<u8>(),
            "name",
            "name",
            "notNull",
        ));
        assert_eq!(app.messages(&errors, None)["name"], vec!["required"]);
        assert_eq!(app.messages(&errors, Some("de"))["name"], vec!["erforderlich"]);
    }
}
