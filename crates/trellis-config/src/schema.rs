//! Configuration schema types.
//!
//! One struct per section of the configuration file.

use serde::{Deserialize, Serialize};
use trellis_telemetry::{LogConfig, LogFormat};

/// Parameter parsing section.
///
/// # Example
///
/// ```
/// use trellis_config::ParamsConfig;
///
/// let config = ParamsConfig {
///     max_index: 500,
///     trim_values: true,
/// };
/// assert_eq!(config.max_index, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParamsConfig {
    /// Largest explicit index accepted in `name[n]`.
    #[serde(default = "default_max_index")]
    pub max_index: usize,

    /// Trim surrounding whitespace from every text value before binding.
    #[serde(default)]
    pub trim_values: bool,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            max_index: default_max_index(),
            trim_values: false,
        }
    }
}

fn default_max_index() -> usize {
    10_000
}

/// Path matching section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Trim whitespace around path tokens before matching.
    #[serde(default = "default_true")]
    pub trim_tokens: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { trim_tokens: true }
    }
}

/// Message rendering section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Locale used when the caller does not name one.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or `target=level` lists).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// The subscriber settings for this section.
    ///
    /// Pretty output also turns on span events and source locations.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json => LogConfig::production(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ..base
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_config_default() {
        let config = ParamsConfig::default();
        assert_eq!(config.max_index, 10_000);
        assert!(!config.trim_values);
    }

    #[test]
    fn test_params_config_deserialize() {
        let config: ParamsConfig = toml::from_str("trim_values = true").unwrap();
        assert!(config.trim_values);
        assert_eq!(config.max_index, 10_000);
    }

    #[test]
    fn test_params_config_unknown_field_rejected() {
        let result: Result<ParamsConfig, _> = toml::from_str("max_depth = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_router_config_default() {
        assert!(RouterConfig::default().trim_tokens);
        let config: RouterConfig = toml::from_str("").unwrap();
        assert!(config.trim_tokens);
    }

    #[test]
    fn test_messages_config_default() {
        assert_eq!(MessagesConfig::default().default_locale, "en");
    }

    #[test]
    fn test_logging_config_deserialize() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "pretty"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_log_config() {
        let config = LoggingConfig {
            enabled: false,
            level: "trellis_binding=debug".to_string(),
            format: LogFormat::Pretty,
        };
        let log = config.to_log_config();
        assert!(!log.enabled);
        assert_eq!(log.level, "trellis_binding=debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(log.file_line_info);

        let log = LoggingConfig::default().to_log_config();
        assert_eq!(log.format, LogFormat::Json);
        assert!(!log.file_line_info);
    }
}
