//! # Trellis
//!
//! **Request parameter binding, validation and Ant-style routing**
//!
//! Trellis turns the flat parameters of a web request into typed beans:
//!
//! - **Routing** – Ant-style path patterns with `{name}` variables
//! - **Parameters** – `user.tags[0]`-style keys folded into a tree
//! - **Binding** – converters write the tree onto `#[derive(Bean)]` structs,
//!   collecting every failure instead of stopping at the first
//! - **Validation** – declarative constraints, cascading through nested beans
//! - **Messages** – errors rendered per locale from a message source
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! #[derive(Debug, Default, Bean)]
//! struct Person {
//!     name: Option<String>,
//!     age: i32,
//! }
//!
//! let app = Trellis::builder()
//!     .route("/people/{id}", MethodRouter::new().post("people#update"))
//!     .build();
//! app.validator().register::<Person>(
//!     Constraints::new()
//!         .property("name", [not_null(), not_blank()])
//!         .property("age", [min(0)]),
//! )?;
//!
//! let found = app.route(&Method::POST, "/people/7").unwrap();
//! let params = app.params(&found.variables, [("name", ["Ada"]), ("age", ["abc"])])?;
//!
//! let mut person = Person::default();
//! let errors = app.bind(&mut person, &params)?;
//! assert_eq!(person.name.as_deref(), Some("Ada"));
//! assert!(errors.has_key("age", "invalid"));
//! ```
//!
//! ## Flow
//!
//! ```text
//! route → params (path variables first) → bind → validate → merge → messages
//! ```
//!
//! Binding errors take precedence: validation errors are only kept for
//! paths the binder did not already report.

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod escape;
pub mod password;

pub use app::{Trellis, TrellisBuilder};

// Re-export the member crates
pub use trellis_binding as binding;
pub use trellis_config as config;
pub use trellis_core as core;
pub use trellis_params as params;
pub use trellis_router as router;
pub use trellis_telemetry as telemetry;
pub use trellis_validation as validation;

// Re-export the derive macros
pub use trellis_macros::{Bean, ParamEnum};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Trellis, TrellisBuilder};

    pub use trellis_core::{
        shared, Bean, BeanType, Errors, MapMessageSource, MessageSource, ParamEnum,
        PropertyError, Shared,
    };

    pub use trellis_params::{ParamValue, Params, ParamsError};

    pub use trellis_router::{MethodRouter, PathVariables, RouteMatch};

    pub use trellis_binding::{Binder, ConversionError, Converter};

    pub use trellis_validation::{
        custom, each, email, max, min, not_blank, not_empty, not_null, pattern, size, valid,
        Constraints, Validator, ValidatorError,
    };

    pub use trellis_config::{ConfigLoader, TrellisConfig};

    pub use http::Method;

    // Derive macros share their names with the traits above.
    pub use trellis_macros::{Bean, ParamEnum};
}
