//! File loading tests.

use std::io::Write;

use tempfile::{Builder, NamedTempFile};
use trellis_config::{ConfigError, ConfigLoader, LogFormat};

fn file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = file_with(
        ".toml",
        r#"
            [params]
            max_index = 64

            [logging]
            format = "pretty"
            level = "trellis_binding=debug,info"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.params.max_index, 64);
    assert!(!config.params.trim_values);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.logging.level, "trellis_binding=debug,info");
    assert_eq!(config.messages.default_locale, "en");
}

#[test]
fn test_json_file_over_preset() {
    let file = file_with(".json", r#"{"router": {"trim_tokens": false}}"#);

    let config = ConfigLoader::new()
        .with_production()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();
    assert!(!config.router.trim_tokens);
    assert!(config.params.trim_values);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_invalid_value_in_file() {
    let file = file_with(".toml", "[params]\nmax_index = 0\n");
    let err = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "params.max_index"));
}

#[test]
fn test_malformed_file() {
    let file = file_with(".toml", "[params\nmax_index = ");
    assert!(matches!(
        ConfigLoader::new().with_file(file.path()),
        Err(ConfigError::TomlError(_))
    ));
}

#[test]
fn test_unknown_extension() {
    let file = file_with(".ini", "max_index=1");
    assert!(matches!(
        ConfigLoader::new().with_file(file.path()),
        Err(ConfigError::UnsupportedFormat { ref format }) if format == "ini"
    ));
}

#[test]
fn test_missing_dotenv_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConfigLoader::new().with_dotenv_file(dir.path().join("missing.env"));
    assert!(matches!(result, Err(ConfigError::Dotenv(_))));
}
