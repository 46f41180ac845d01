//! Layered configuration loading.
//!
//! Layers are applied in order, later ones overriding earlier ones:
//! 1. Defaults (or a preset)
//! 2. Configuration files and strings (TOML or JSON)
//! 3. Environment variables
//!
//! A file only overrides the keys it sets; everything else keeps the value
//! of the layer below.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;
use trellis_telemetry::LogFormat;

use crate::{ConfigError, ConfigResult, TrellisConfig};

/// Configuration loader.
///
/// ```no_run
/// use trellis_config::ConfigLoader;
///
/// # fn main() -> Result<(), trellis_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("trellis.toml")?
///     .with_env_prefix("TRELLIS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: TrellisConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TrellisConfig::default(),
            env_prefix: None,
        }
    }

    /// Start over from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TrellisConfig::development();
        self
    }

    /// Start over from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = TrellisConfig::production();
        self
    }

    /// Overlay a configuration file; the format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// has an unsupported extension or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        self.with_string(&content, &format)
    }

    /// Overlay a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// As [`with_file`](Self::with_file) for an existing file.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Overlay configuration text in `format` (`"toml"` or `"json"`).
    ///
    /// ```
    /// use trellis_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[params]\nmax_index = 99", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.params.max_index, 99);
    /// assert!(config.router.trim_tokens);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or a field is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> ConfigResult<Self> {
        let overlay: Value = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, overlay);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Read overrides from `PREFIX__SECTION__KEY` variables when loading.
    ///
    /// With prefix `TRELLIS`, `TRELLIS__PARAMS__MAX_INDEX=500` sets
    /// `params.max_index`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from `.env` in the working directory, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but is malformed.
    pub fn with_dotenv(self) -> ConfigResult<Self> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e.to_string())),
        }
    }

    /// Load variables from a specific env file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        dotenvy::from_path(path.as_ref()).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable does not parse or validation fails.
    pub fn load(mut self) -> ConfigResult<TrellisConfig> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TrellisConfig {
        self.config
    }

    fn apply_env_overrides<I>(&mut self, prefix: &str, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if key.starts_with(&marker) {
                self.apply_env_var(&key, &value, prefix)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> ConfigResult<()> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = rest.split("__").collect();
        match parts.as_slice() {
            ["PARAMS", "MAX_INDEX"] => {
                self.config.params.max_index = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["PARAMS", "TRIM_VALUES"] => {
                self.config.params.trim_values = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ROUTER", "TRIM_TOKENS"] => {
                self.config.router.trim_tokens = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["MESSAGES", "DEFAULT_LOCALE"] => {
                self.config.messages.default_locale = value.to_string();
            }
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            // Unknown keys are left for other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

/// Recursively overlays `overlay` onto `base`; non-table values replace.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, TrellisConfig::default());
    }

    #[test]
    fn test_string_overlays_preset() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string(r#"{"params": {"trim_values": true}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(config.params.trim_values);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_later_layers_win() {
        let config = ConfigLoader::new()
            .with_string("[messages]\ndefault_locale = \"de\"", "toml")
            .unwrap()
            .with_string("[messages]\ndefault_locale = \"fr\"", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.messages.default_locale, "fr");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[params]\nmax_depth = 2", "toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let err = ConfigLoader::new().with_string("a: 1", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ConfigLoader::new().with_file("/nonexistent/trellis.toml"),
            Err(ConfigError::FileNotFound { .. })
        ));
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/trellis.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.params.max_index, 10_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_overrides(
                "TEST",
                vars(&[
                    ("TEST__PARAMS__MAX_INDEX", "250"),
                    ("TEST__PARAMS__TRIM_VALUES", "yes"),
                    ("TEST__ROUTER__TRIM_TOKENS", "off"),
                    ("TEST__MESSAGES__DEFAULT_LOCALE", "de_AT"),
                    ("TEST__LOGGING__FORMAT", "Pretty"),
                    ("TEST__LOGGING__LEVEL", "warn"),
                    ("TEST__UNKNOWN__KEY", "ignored"),
                    ("OTHER__PARAMS__MAX_INDEX", "1"),
                    ("TESTING__PARAMS__MAX_INDEX", "2"),
                ]),
            )
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.params.max_index, 250);
        assert!(config.params.trim_values);
        assert!(!config.router.trim_tokens);
        assert_eq!(config.messages.default_locale, "de_AT");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_parse_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("T__PARAMS__MAX_INDEX", "many", "T")
            .is_err());
        assert!(loader
            .apply_env_var("T__LOGGING__ENABLED", "maybe", "T")
            .is_err());
        assert!(loader
            .apply_env_var("T__LOGGING__FORMAT", "xml", "T")
            .is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_merge_values_nested() {
        let mut base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        merge_values(&mut base, serde_json::json!({"a": {"y": 5}, "c": 4}));
        assert_eq!(base, serde_json::json!({"a": {"x": 1, "y": 5}, "b": 3, "c": 4}));
    }
}
