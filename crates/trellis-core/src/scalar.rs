//! Scalar property values.

use std::any::Any;
use std::fmt;

use crate::types::{Converted, TypeInfo};

/// A leaf value that converters produce and constraints inspect.
///
/// Implemented for the integer and float primitives, `bool`, `char`,
/// `String`, and for enums through `#[derive(ParamEnum)]`.
pub trait Scalar: Any + Send + Sync + fmt::Debug {
    /// Returns the concrete type of the value.
    fn type_info(&self) -> TypeInfo;

    /// Default text form, used when no formatter is registered.
    fn to_text(&self) -> String;

    /// Returns `self` as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Numeric view for range constraints.
    fn as_f64(&self) -> Option<f64> {
        None
    }

    /// Text view for string constraints.
    fn as_str(&self) -> Option<&str> {
        None
    }
}

macro_rules! numeric_scalar {
    ($kind:ident => $($ty:ty),+) => {$(
        impl Scalar for $ty {
            fn type_info(&self) -> TypeInfo {
                TypeInfo::scalar::<$ty>($crate::ScalarKind::$kind)
            }

            fn to_text(&self) -> String {
                self.to_string()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            #[allow(clippy::cast_lossless, clippy::cast_possible_truncation, clippy::unnecessary_cast)]
            fn as_f64(&self) -> Option<f64> {
                Some(*self as f64)
            }
        }
    )+};
}

numeric_scalar!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
numeric_scalar!(Float => f32, f64);

impl Scalar for bool {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::scalar::<bool>(crate::ScalarKind::Boolean)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Scalar for char {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::scalar::<char>(crate::ScalarKind::Char)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Scalar for String {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::scalar::<String>(crate::ScalarKind::Text)
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_str(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

/// A fieldless enum bound from its variant names.
///
/// Derive it with `#[derive(ParamEnum)]`; the derive also makes the enum
/// usable as a bean property.
pub trait ParamEnum: Scalar + Sized {
    /// All variants in declaration order.
    fn variants() -> &'static [Self];

    /// The parameter name of this variant.
    fn name(&self) -> &'static str;

    /// Looks a variant up by its parameter name.
    fn from_name(name: &str) -> Option<Self>;

    /// Type metadata carrying the by-name constructor.
    fn enum_type_info() -> TypeInfo {
        TypeInfo::enumeration::<Self>(parse_variant::<Self>)
    }
}

fn parse_variant<E: ParamEnum>(name: &str) -> Option<Converted> {
    E::from_name(name).map(|value| Box::new(value) as Converted)
}
