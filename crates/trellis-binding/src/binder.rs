//! The binder.
//!
//! Walks the declared properties of a bean against a parameter tree and
//! writes converted values through the property accessors. Every per-field
//! problem becomes a [`PropertyError`]; `bind` itself never fails.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};
use trellis_core::{
    index_path, join_path, Bean, CollectionKind, Converted, Errors, Field, PropertyError, Scalar,
    ScalarKind, Shape, TypeInfo,
};
use trellis_params::{ParamValue, Params};
use trellis_telemetry::metrics::record_binding;

use crate::context::BindingContext;
use crate::converter::{install_builtins, ConversionResult, Converter, FormatFn};
use crate::error::ConversionError;
use crate::property::BeanProperty;

/// Converter and formatter registry plus the binding walk.
///
/// Registries are concurrent maps: fill them at setup, then share the
/// binder across threads.
///
/// ```rust
/// use trellis_binding::Binder;
///
/// let binder = Binder::new();
/// binder.register::<u32, _, _>(|raw: &str| raw.trim().parse::<u32>());
/// assert_eq!(binder.format(Some(&7_u32)), "7");
/// assert_eq!(binder.format(None), "");
/// ```
pub struct Binder {
    converters: DashMap<TypeId, Converter>,
    kind_converters: DashMap<ScalarKind, Converter>,
    formatters: DashMap<TypeId, Arc<FormatFn>>,
    kind_formatters: DashMap<ScalarKind, Arc<FormatFn>>,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("converters", &self.converters.len())
            .field("kind_converters", &self.kind_converters.len())
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl Binder {
    /// Creates a binder with the built-in converters installed.
    #[must_use]
    pub fn new() -> Self {
        let binder = Self::empty();
        install_builtins(&binder);
        binder
    }

    /// Creates a binder without any converters.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            converters: DashMap::new(),
            kind_converters: DashMap::new(),
            formatters: DashMap::new(),
            kind_formatters: DashMap::new(),
        }
    }

    /// Registers a value-only converter for `T`, replacing any previous one.
    pub fn register<T, F, E>(&self, convert: F) -> &Self
    where
        T: Any + Send + Sync,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.register_converter::<T>(Converter::value(move |raw| {
            convert(raw)
                .map(|value| Some(Box::new(value) as Converted))
                .map_err(ConversionError::from_display)
        }))
    }

    /// Registers a converter that also receives the property being bound.
    pub fn register_contextual<T, F, E>(&self, convert: F) -> &Self
    where
        T: Any + Send + Sync,
        F: Fn(&BeanProperty, &str) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.register_converter::<T>(Converter::contextual(move |property, raw| {
            convert(property, raw)
                .map(|value| Some(Box::new(value) as Converted))
                .map_err(ConversionError::from_display)
        }))
    }

    /// Registers a converter together with a formatter for `T`.
    pub fn register_with_formatter<T, F, E, G>(&self, convert: F, format: G) -> &Self
    where
        T: Scalar,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
        G: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.register::<T, F, E>(convert);
        self.register_formatter::<T, G>(format)
    }

    /// Registers a prepared converter for `T`.
    pub fn register_converter<T: Any>(&self, converter: Converter) -> &Self {
        self.converters.insert(TypeId::of::<T>(), converter);
        self
    }

    /// Registers a converter for a whole scalar family.
    ///
    /// Family converters apply when no converter is registered for the exact
    /// type; a later registration for the same family replaces the earlier.
    pub fn register_kind(&self, kind: ScalarKind, converter: Converter) -> &Self {
        self.kind_converters.insert(kind, converter);
        self
    }

    /// Registers a formatter for `T`.
    pub fn register_formatter<T, G>(&self, format: G) -> &Self
    where
        T: Scalar,
        G: Fn(&T) -> String + Send + Sync + 'static,
    {
        let format: Arc<FormatFn> = Arc::new(move |value: &dyn Scalar| {
            value
                .as_any()
                .downcast_ref::<T>()
                .map_or_else(|| value.to_text(), &format)
        });
        self.formatters.insert(TypeId::of::<T>(), format);
        self
    }

    /// Registers a formatter for a whole scalar family.
    pub fn register_kind_formatter<G>(&self, kind: ScalarKind, format: G) -> &Self
    where
        G: Fn(&dyn Scalar) -> String + Send + Sync + 'static,
    {
        self.kind_formatters.insert(kind, Arc::new(format));
        self
    }

    /// Returns true if a converter applies to `ty`.
    #[must_use]
    pub fn has_converter(&self, ty: TypeInfo) -> bool {
        self.converter_for(ty).is_some()
    }

    fn converter_for(&self, ty: TypeInfo) -> Option<Converter> {
        if let Some(converter) = self.converters.get(&ty.id()) {
            return Some(converter.clone());
        }
        self.kind_converters
            .get(&ty.kind())
            .map(|converter| converter.clone())
    }

    /// Formats a value: exact formatter, then family formatter, then the
    /// value's own text form. `None` formats as the empty string.
    #[must_use]
    pub fn format(&self, value: Option<&dyn Scalar>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        let ty = value.type_info();
        let formatter = self
            .formatters
            .get(&ty.id())
            .map(|f| Arc::clone(&f))
            .or_else(|| self.kind_formatters.get(&ty.kind()).map(|f| Arc::clone(&f)));
        match formatter {
            Some(format) => format(value),
            None => value.to_text(),
        }
    }

    /// Converts raw text to the declared type of `property`.
    ///
    /// Empty text on a nullable property is `Ok(None)` without consulting a
    /// converter.
    pub fn convert(&self, property: &BeanProperty, raw: &str) -> ConversionResult {
        let declared = property.declared();
        if raw.is_empty() && declared.nullable {
            return Ok(None);
        }
        match self.converter_for(declared.ty) {
            Some(converter) => converter.convert(property, raw),
            None if raw.is_empty() => Ok(None),
            None => Err(ConversionError::new(format!(
                "no converter registered for {}",
                declared.ty.simple_name()
            ))),
        }
    }

    /// Binds `params` onto `target` and returns the binding errors.
    pub fn bind(&self, target: &mut dyn Bean, params: &Params) -> Errors {
        let root = target.bean_type();
        let context = BindingContext::root(root, params);
        let mut errors = Errors::new();
        Walk {
            binder: self,
            errors: &mut errors,
        }
        .bean(&context, target);

        let bean = root.simple_name();
        debug!(
            bean_type = %bean,
            error_count = errors.error_count(),
            "bound parameters"
        );
        record_binding(&bean, errors.error_count());
        errors
    }
}

/// State of one `bind` call.
struct Walk<'b, 'e> {
    binder: &'b Binder,
    errors: &'e mut Errors,
}

impl Walk<'_, '_> {
    fn bean<'a>(&mut self, context: &BindingContext<'a>, bean: &mut dyn Bean) {
        let leaf = bean.bean_type();
        for name in bean.property_names() {
            let Some(value) = context.params().get(name) else {
                continue;
            };
            let Some(field) = bean.field_mut(name) else {
                continue;
            };
            let property = BeanProperty::new(
                name,
                context.property_path(name),
                field.field_type(),
                leaf,
                context.root_type(),
            );
            self.property(context, &property, field, value);
        }
    }

    fn property<'a>(
        &mut self,
        context: &BindingContext<'a>,
        property: &BeanProperty,
        field: &mut dyn Field,
        value: &'a ParamValue,
    ) {
        match (value, &property.declared().shape) {
            (ParamValue::Map(entries), Shape::Map { .. }) => {
                self.map(context, property, field, entries);
            }
            (ParamValue::Map(params), Shape::Bean) => self.nested(context, property, field, params),
            (ParamValue::Map(map), Shape::Scalar) if map.is_empty() => {
                self.scalar(property, field, "");
            }
            (ParamValue::Map(map), Shape::Collection { .. }) if map.is_empty() => {
                if let Some(sink) = field.collection_mut() {
                    sink.clear();
                }
            }
            (ParamValue::List(items), Shape::Collection { .. }) => {
                self.collection(context, property, field, items);
            }
            (ParamValue::Text(raw), Shape::Scalar) => self.scalar(property, field, raw),
            (ParamValue::Text(_), Shape::Collection { .. }) => {
                self.collection(context, property, field, std::slice::from_ref(value));
            }
            (other, _) => self.mismatch(property, property.path(), other),
        }
    }

    fn scalar(&mut self, property: &BeanProperty, field: &mut dyn Field, raw: &str) {
        let outcome = match self.binder.convert(property, raw) {
            Ok(Some(value)) => field.assign(Some(value)).map_err(|e| {
                warn!(path = property.path(), error = %e, "converter produced the wrong type");
                e
            }),
            Ok(None) if property.declared().nullable => field.assign(None),
            Ok(None) => Ok(()),
            Err(e) => {
                self.reject(property, property.path(), property.declared().ty, Some(raw), &e);
                return;
            }
        };
        if let Err(e) = outcome {
            self.reject_field(property, raw, &e.to_string());
        }
    }

    fn nested<'a>(
        &mut self,
        context: &BindingContext<'a>,
        property: &BeanProperty,
        field: &mut dyn Field,
        params: &'a Params,
    ) {
        match field.bean_mut(true) {
            Ok(Some(mut bean)) => {
                let child = context.update(bean.bean_type(), property.path(), params);
                self.bean(&child, &mut *bean);
            }
            Ok(None) => self.reject_field(property, "", "property holds no bean"),
            Err(e) => self.reject_field(property, "", &e.to_string()),
        }
    }

    fn collection<'a>(
        &mut self,
        context: &BindingContext<'a>,
        property: &BeanProperty,
        field: &mut dyn Field,
        items: &'a [ParamValue],
    ) {
        let Shape::Collection { kind, element } = &property.declared().shape else {
            return;
        };
        let refusal = match (element, kind) {
            (None, _) => Some("raw collection has no element type"),
            (_, CollectionKind::Unsupported) => Some("unsupported collection type"),
            _ => None,
        };
        let target = match (refusal, element) {
            (None, Some(element)) => field
                .collection_mut()
                .map(|sink| (sink, element.as_ref())),
            _ => None,
        };
        let Some((sink, element)) = target else {
            let message = refusal.unwrap_or("collection cannot be populated");
            for (i, item) in items.iter().enumerate() {
                let raw = item.as_text();
                self.reject(
                    property,
                    &index_path(property.path(), i),
                    property.declared().ty,
                    raw,
                    &ConversionError::new(message),
                );
            }
            return;
        };

        sink.clear();
        for (i, item) in items.iter().enumerate() {
            let path = index_path(property.path(), i);
            let narrowed = property.narrow(path.clone(), element.clone());
            match (item, &element.shape) {
                (ParamValue::Map(params), Shape::Bean) => {
                    let child = context.update(element.ty, path, params);
                    let binder = self.binder;
                    let errors = &mut *self.errors;
                    let pushed = sink.push_bean(&mut |bean: &mut dyn Bean| {
                        Walk {
                            binder,
                            errors: &mut *errors,
                        }
                        .bean(&child, bean);
                    });
                    if let Err(e) = pushed {
                        self.reject_field(&narrowed, "", &e.to_string());
                    }
                }
                (item, Shape::Scalar) if item.as_text().is_some() || item.is_placeholder() => {
                    let raw = item.as_text().unwrap_or_default();
                    match self.binder.convert(&narrowed, raw) {
                        Ok(Some(value)) => {
                            if let Err(e) = sink.push_converted(Some(value)) {
                                self.reject_field(&narrowed, raw, &e.to_string());
                            }
                        }
                        Ok(None) => {}
                        Err(e) => self.reject(&narrowed, &path, element.ty, Some(raw), &e),
                    }
                }
                (other, _) => self.mismatch(&narrowed, &path, other),
            }
        }
    }

    fn map<'a>(
        &mut self,
        context: &BindingContext<'a>,
        property: &BeanProperty,
        field: &mut dyn Field,
        entries: &'a Params,
    ) {
        let Shape::Map { key, value } = &property.declared().shape else {
            return;
        };
        let (key_type, value_type) = (key.as_ref(), value.as_ref());
        let Some(sink) = field.map_mut() else {
            for (name, item) in entries.iter() {
                let path = join_path(property.path(), name);
                self.reject(
                    property,
                    &path,
                    value_type.ty,
                    item.as_text(),
                    &ConversionError::new("map cannot be populated"),
                );
            }
            return;
        };

        for (name, item) in entries.iter() {
            let path = join_path(property.path(), name);
            let key_property = property.narrow(path.clone(), key_type.clone());
            let value_property = property.narrow(path.clone(), value_type.clone());

            let converted_key = match self.binder.convert(&key_property, name) {
                Ok(Some(key)) => key,
                Ok(None) => {
                    self.reject_field(&key_property, name, "map key converted to nothing");
                    continue;
                }
                Err(e) => {
                    self.reject(&key_property, &path, key_type.ty, Some(name), &e);
                    continue;
                }
            };

            match (item, &value_type.shape) {
                (ParamValue::Map(params), Shape::Bean) => {
                    let child = context.update(value_type.ty, path, params);
                    let binder = self.binder;
                    let errors = &mut *self.errors;
                    let inserted = sink.insert_bean(converted_key, &mut |bean: &mut dyn Bean| {
                        Walk {
                            binder,
                            errors: &mut *errors,
                        }
                        .bean(&child, bean);
                    });
                    if let Err(e) = inserted {
                        self.reject_field(&value_property, "", &e.to_string());
                    }
                }
                (item, Shape::Scalar) if item.as_text().is_some() || item.is_placeholder() => {
                    let raw = item.as_text().unwrap_or_default();
                    match self.binder.convert(&value_property, raw) {
                        Ok(value) => {
                            if let Err(e) = sink.insert_converted(converted_key, value) {
                                self.reject_field(&value_property, raw, &e.to_string());
                            }
                        }
                        Err(e) => self.reject(&value_property, &path, value_type.ty, Some(raw), &e),
                    }
                }
                (other, _) => self.mismatch(&value_property, &path, other),
            }
        }
    }

    /// The parameter shape does not fit the declared type.
    fn mismatch(&mut self, property: &BeanProperty, path: &str, value: &ParamValue) {
        let declared = property.declared().ty;
        let error = ConversionError::new(format!(
            "cannot bind a {} to {}",
            value.kind(),
            declared.simple_name()
        ));
        self.reject(property, path, declared, value.as_text(), &error);
    }

    /// The value converted but could not be stored.
    fn reject_field(&mut self, property: &BeanProperty, raw: &str, message: &str) {
        let raw = (!raw.is_empty()).then_some(raw);
        self.reject(
            property,
            property.path(),
            property.declared().ty,
            raw,
            &ConversionError::new(message),
        );
    }

    fn reject(
        &mut self,
        property: &BeanProperty,
        path: &str,
        property_type: TypeInfo,
        raw: Option<&str>,
        error: &ConversionError,
    ) {
        self.errors.add(
            PropertyError::new(
                property.root_type(),
                property.leaf_type(),
                path,
                property.name(),
                error.key(),
            )
            .with_property_type(property_type)
            .with_invalid_value(raw.map(str::to_string))
            .with_detail(error.message()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{downcast, Element, FieldType};

    struct Form;

    fn property(declared: FieldType) -> BeanProperty {
        BeanProperty::new(
            "value",
            "value",
            declared,
            TypeInfo::of::<Form>(),
            TypeInfo::of::<Form>(),
        )
    }

    #[test]
    fn test_empty_nullable_skips_converter() {
        let binder = Binder::empty();
        binder.register::<i32, _, _>(|_: &str| Err::<i32, _>("never called"));
        let nullable = property(i32::element_type().nullable());
        assert!(binder.convert(&nullable, "").unwrap().is_none());
        assert!(binder.convert(&nullable, "1").is_err());
    }

    #[test]
    fn test_missing_converter() {
        let binder = Binder::empty();
        let plain = property(i32::element_type());
        assert!(binder.convert(&plain, "").unwrap().is_none());
        let err = binder.convert(&plain, "5").unwrap_err();
        assert_eq!(err.message(), "no converter registered for i32");
    }

    #[test]
    fn test_exact_converter_beats_family() {
        let binder = Binder::empty();
        binder.register_kind(
            ScalarKind::Integer,
            Converter::value(|_| Ok(Some(Box::new(1_i64) as Converted))),
        );
        binder.register::<i64, _, _>(|raw: &str| raw.parse::<i64>());

        let value = binder.convert(&property(i64::element_type()), "7").unwrap().unwrap();
        assert_eq!(downcast::<i64>(value).unwrap(), 7);

        let value = binder.convert(&property(u64::element_type()), "7").unwrap().unwrap();
        assert_eq!(downcast::<i64>(value).unwrap(), 1);
    }

    #[test]
    fn test_registration_replaces() {
        let binder = Binder::new();
        binder.register::<String, _, _>(|raw: &str| Ok::<_, String>(raw.trim().to_string()));
        let value = binder
            .convert(&property(String::element_type()), "  x ")
            .unwrap()
            .unwrap();
        assert_eq!(downcast::<String>(value).unwrap(), "x");
        assert!(format!("{binder:?}").starts_with("Binder"));
    }
}
