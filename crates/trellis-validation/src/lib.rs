//! # Trellis Validation
//!
//! Declarative constraints over bean graphs.
//!
//! Constraints are registered per bean type with a [`Constraints`] set and
//! applied by the [`Validator`]. Violations come back as
//! [`Errors`](trellis_core::Errors) keyed by property path, the same shape
//! the binder produces, so both can be merged and rendered together.
//!
//! ```rust,ignore
//! use trellis_validation::{each, not_blank, not_null, size, valid, Constraints, Validator};
//!
//! let validator = Validator::new();
//! validator.register::<Order>(
//!     Constraints::new()
//!         .property("customer", [not_null(), valid()])
//!         .property("lines", [size(1, 50), valid()])
//!         .property("tags", [each([not_blank()])]),
//! )?;
//! validator.register::<Customer>(Constraints::new().property("name", [not_blank()]))?;
//!
//! let errors = validator.validate(&order)?;
//! ```
//!
//! [`valid`] cascades into nested beans. Each bean is entered at most once
//! per call, so graphs with shared nodes or cycles are safe to validate.

#![doc(html_root_url = "https://docs.rs/trellis-validation/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod constraint;
pub mod constraints;
mod context;
mod error;
mod validator;

pub use constraint::{BoxedConstraint, Constraint, Constraints};
pub use constraints::{
    custom, each, email, max, min, not_blank, not_empty, not_null, pattern, size, valid,
};
pub use context::{PropertyValue, ValidationContext};
pub use error::{ValidationResult, ValidatorError};
pub use validator::Validator;
