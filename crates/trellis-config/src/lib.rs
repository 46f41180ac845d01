//! # Trellis Config
//!
//! Typed, layered configuration for Trellis:
//! - TOML and JSON files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layering: defaults → files → environment
//!
//! ```no_run
//! use trellis_config::ConfigLoader;
//!
//! # fn main() -> Result<(), trellis_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("trellis.toml")?
//!     .with_env_prefix("TRELLIS")
//!     .load()?;
//!
//! println!("largest list index: {}", config.params.max_index);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [params]
//! max_index = 10000
//! trim_values = false
//!
//! [router]
//! trim_tokens = true
//!
//! [messages]
//! default_locale = "en"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment overrides
//!
//! Variables follow `PREFIX__SECTION__KEY`, e.g.
//! `TRELLIS__PARAMS__MAX_INDEX=500` or `TRELLIS__LOGGING__FORMAT=pretty`.

#![doc(html_root_url = "https://docs.rs/trellis-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{TrellisConfig, TrellisConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{LoggingConfig, MessagesConfig, ParamsConfig, RouterConfig};
pub use trellis_telemetry::LogFormat;
