//! Root configuration type and its builder.

use serde::{Deserialize, Serialize};
use trellis_telemetry::LogFormat;

use crate::{ConfigError, ConfigResult, LoggingConfig, MessagesConfig, ParamsConfig, RouterConfig};

/// Complete Trellis configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// ```
/// use trellis_config::TrellisConfig;
///
/// let config = TrellisConfig::default();
/// assert_eq!(config.params.max_index, 10_000);
/// assert_eq!(config.messages.default_locale, "en");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Parameter parsing.
    #[serde(default)]
    pub params: ParamsConfig,

    /// Path matching.
    #[serde(default)]
    pub router: RouterConfig,

    /// Message rendering.
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrellisConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TrellisConfigBuilder {
        TrellisConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `params.max_index` is zero
    /// - `messages.default_locale` is blank
    /// - `logging.level` is blank while logging is enabled
    pub fn validate(&self) -> ConfigResult<()> {
        if self.params.max_index == 0 {
            return Err(ConfigError::invalid_value(
                "params.max_index",
                "must be greater than 0",
            ));
        }

        if self.messages.default_locale.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "messages.default_locale",
                "must not be blank",
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be blank when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Production preset: JSON logging at info, values trimmed before binding.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.params.trim_values = true;
        config
    }
}

/// Builder for [`TrellisConfig`].
#[derive(Debug, Default)]
pub struct TrellisConfigBuilder {
    params: Option<ParamsConfig>,
    router: Option<RouterConfig>,
    messages: Option<MessagesConfig>,
    logging: Option<LoggingConfig>,
}

impl TrellisConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameter parsing section.
    #[must_use]
    pub fn params(mut self, params: ParamsConfig) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the path matching section.
    #[must_use]
    pub fn router(mut self, router: RouterConfig) -> Self {
        self.router = Some(router);
        self
    }

    /// Set the message rendering section.
    #[must_use]
    pub fn messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration; unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> TrellisConfig {
        TrellisConfig {
            params: self.params.unwrap_or_default(),
            router: self.router.unwrap_or_default(),
            messages: self.messages.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> ConfigResult<TrellisConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
