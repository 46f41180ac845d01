//! Converters and formatters.
//!
//! A converter turns raw parameter text into a typed value. It either sees
//! only the text or, when registered as contextual, also the
//! [`BeanProperty`] being bound. `Ok(None)` means "no value": the property
//! becomes null when nullable and is left alone otherwise.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use trellis_core::{Converted, Scalar, ScalarKind};

use crate::error::ConversionError;
use crate::property::BeanProperty;

/// Outcome of a conversion.
pub type ConversionResult = Result<Option<Converted>, ConversionError>;

/// Converter taking only the raw text.
pub type ValueFn = dyn Fn(&str) -> ConversionResult + Send + Sync;

/// Converter taking the property and the raw text.
pub type ContextualFn = dyn Fn(&BeanProperty, &str) -> ConversionResult + Send + Sync;

/// Formatter producing the text form of a value.
pub type FormatFn = dyn Fn(&dyn Scalar) -> String + Send + Sync;

/// A registered converter.
#[derive(Clone)]
pub enum Converter {
    /// `Fn(&str)`
    Value(Arc<ValueFn>),
    /// `Fn(&BeanProperty, &str)`
    Contextual(Arc<ContextualFn>),
}

impl Converter {
    /// Wraps a value-only converter.
    pub fn value<F>(convert: F) -> Self
    where
        F: Fn(&str) -> ConversionResult + Send + Sync + 'static,
    {
        Self::Value(Arc::new(convert))
    }

    /// Wraps a contextual converter.
    pub fn contextual<F>(convert: F) -> Self
    where
        F: Fn(&BeanProperty, &str) -> ConversionResult + Send + Sync + 'static,
    {
        Self::Contextual(Arc::new(convert))
    }

    /// Runs the converter.
    pub fn convert(&self, property: &BeanProperty, raw: &str) -> ConversionResult {
        match self {
            Self::Value(convert) => convert(raw),
            Self::Contextual(convert) => convert(property, raw),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Converter::Value"),
            Self::Contextual(_) => f.write_str("Converter::Contextual"),
        }
    }
}

/// Numbers: empty text is zero, anything else must parse.
fn number<T>(raw: &str) -> ConversionResult
where
    T: FromStr + Default + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    if raw.is_empty() {
        return Ok(Some(Box::new(T::default())));
    }
    raw.parse::<T>()
        .map(|value| Some(Box::new(value) as Converted))
        .map_err(ConversionError::from_display)
}

/// Only a case-insensitive `false` is false; empty is false too.
fn boolean(raw: &str) -> ConversionResult {
    let value = !raw.is_empty() && !raw.eq_ignore_ascii_case("false");
    Ok(Some(Box::new(value)))
}

fn character(raw: &str) -> ConversionResult {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(Some(Box::new('\0'))),
        (Some(c), None) => Ok(Some(Box::new(c))),
        _ => Err(ConversionError::new(format!(
            "expected a single character, got \"{raw}\""
        ))),
    }
}

fn text(raw: &str) -> ConversionResult {
    Ok(Some(Box::new(raw.to_string())))
}

/// Enums by variant name, through the constructor carried by their type info.
fn enumeration(property: &BeanProperty, raw: &str) -> ConversionResult {
    if raw.is_empty() {
        return Ok(None);
    }
    let ty = property.declared().ty;
    ty.parse_name(raw).map(Some).ok_or_else(|| {
        ConversionError::new(format!("no variant of {} named \"{raw}\"", ty.simple_name()))
    })
}

/// Registers the built-in converters on a binder.
pub(crate) fn install_builtins(binder: &crate::Binder) {
    macro_rules! numbers {
        ($($ty:ty),+) => {$(
            binder.register_converter::<$ty>(Converter::value(number::<$ty>));
        )+};
    }
    numbers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

    binder.register_converter::<bool>(Converter::value(boolean));
    binder.register_converter::<char>(Converter::value(character));
    binder.register_converter::<String>(Converter::value(text));
    binder.register_kind(ScalarKind::Enum, Converter::contextual(enumeration));
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{downcast, FieldType, TypeInfo};

    fn run(result: ConversionResult) -> Option<Converted> {
        result.unwrap()
    }

    #[test]
    fn test_number_defaults_to_zero() {
        assert_eq!(downcast::<i32>(run(number::<i32>("")).unwrap()).unwrap(), 0);
        assert_eq!(downcast::<i32>(run(number::<i32>("-12")).unwrap()).unwrap(), -12);
        assert_eq!(downcast::<f64>(run(number::<f64>("2.5")).unwrap()).unwrap(), 2.5);
        assert!(number::<u8>("300").is_err());
        assert!(number::<i32>("abc").is_err());
    }

    #[test]
    fn test_boolean_is_lenient() {
        let parse = |raw| downcast::<bool>(run(boolean(raw)).unwrap()).unwrap();
        assert!(!parse("false"));
        assert!(!parse("FaLsE"));
        assert!(!parse(""));
        assert!(parse("true"));
        assert!(parse("on"));
        assert!(parse("garbage"));
    }

    #[test]
    fn test_character() {
        assert_eq!(downcast::<char>(run(character("x")).unwrap()).unwrap(), 'x');
        assert_eq!(downcast::<char>(run(character("")).unwrap()).unwrap(), '\0');
        assert!(character("xy").is_err());
    }

    #[test]
    fn test_enumeration_uses_type_info() {
        fn parse(name: &str) -> Option<Converted> {
            (name == "RED").then(|| Box::new(1_u8) as Converted)
        }
        struct Form;
        let property = BeanProperty::new(
            "color",
            "color",
            FieldType::scalar(TypeInfo::enumeration::<u8>(parse)),
            TypeInfo::of::<Form>(),
            TypeInfo::of::<Form>(),
        );
        assert!(enumeration(&property, "RED").unwrap().is_some());
        assert!(enumeration(&property, "").unwrap().is_none());
        let err = enumeration(&property, "BLUE").unwrap_err();
        assert!(err.message().contains("BLUE"));
    }

    #[test]
    fn test_converter_dispatch() {
        struct Form;
        let property = BeanProperty::new(
            "n",
            "n",
            FieldType::scalar(TypeInfo::of::<String>()),
            TypeInfo::of::<Form>(),
            TypeInfo::of::<Form>(),
        );
        let value = Converter::value(text);
        let contextual = Converter::contextual(|property: &BeanProperty, raw: &str| {
            Ok(Some(Box::new(format!("{}={raw}", property.name())) as Converted))
        });
        assert_eq!(
            downcast::<String>(value.convert(&property, "a").unwrap().unwrap()).unwrap(),
            "a"
        );
        assert_eq!(
            downcast::<String>(contextual.convert(&property, "a").unwrap().unwrap()).unwrap(),
            "n=a"
        );
        assert_eq!(format!("{contextual:?}"), "Converter::Contextual");
    }
}
