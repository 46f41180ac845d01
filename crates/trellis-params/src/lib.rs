//! # Trellis Params
//!
//! Turns flat request parameters into a nested, ordered tree.
//!
//! ```text
//! user.name=Ada&user.tags[]=math&user.tags[]=poetry&_roles[]
//! ```
//!
//! becomes
//!
//! ```text
//! { user: { name: "Ada", tags: ["math", "poetry"] }, roles: [] }
//! ```
//!
//! The tree is what the binder walks. It also supports typed reads
//! ([`Params::optional`], [`Params::required`]) and projections
//! ([`Params::excluding`], [`Params::including`], [`Params::sub_params`],
//! [`Params::trim`]).

#![doc(html_root_url = "https://docs.rs/trellis-params/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod access;
mod error;
mod parse;
mod project;
mod value;

pub use access::FromParam;
pub use error::{ParamsError, ParamsResult};
pub use parse::{ParseOptions, DEFAULT_MAX_INDEX};
pub use value::{ParamValue, Params};
