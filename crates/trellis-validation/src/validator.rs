//! The validator.
//!
//! Holds one [`Constraints`] registration per bean type and applies it to
//! a bean graph, cascading through properties marked [`valid`](crate::valid).

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use trellis_core::{identity, Bean, BeanType, Errors, TypeInfo};
use trellis_telemetry::metrics::record_validation;

use crate::constraint::Constraints;
use crate::context::ValidationContext;
use crate::error::{ValidationResult, ValidatorError};

/// Constraint registry and graph walk.
///
/// ```rust
/// use trellis_core::Bean;
/// use trellis_macros::Bean;
/// use trellis_validation::{min, Constraints, Validator};
///
/// #[derive(Default, Bean)]
/// struct Person {
///     age: i32,
/// }
///
/// let validator = Validator::new();
/// validator
///     .register::<Person>(Constraints::new().property("age", [min(0)]))
///     .unwrap();
///
/// let errors = validator.validate(&Person { age: -1 }).unwrap();
/// assert!(errors.has_key("age", "min"));
/// ```
#[derive(Default)]
pub struct Validator {
    registry: DashMap<TypeId, Arc<Constraints>>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("registered", &self.registry.len())
            .finish()
    }
}

impl Validator {
    /// Creates a validator with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the constraints of `B`, replacing any earlier registration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::UnknownProperty`] if a constraint names a
    /// property `B` does not have.
    pub fn register<B: BeanType>(&self, constraints: Constraints) -> ValidationResult<&Self> {
        let properties = B::properties();
        if let Some(unknown) = constraints
            .property_names()
            .find(|name| !properties.contains(name))
        {
            return Err(ValidatorError::unknown_property(
                TypeInfo::of::<B>().simple_name(),
                unknown,
            ));
        }
        self.registry
            .insert(TypeId::of::<B>(), Arc::new(constraints));
        Ok(self)
    }

    /// Returns true if `B` has registered constraints.
    #[must_use]
    pub fn is_registered<B: BeanType>(&self) -> bool {
        self.registry.contains_key(&TypeId::of::<B>())
    }

    /// Returns true if the type has registered constraints.
    #[must_use]
    pub fn is_registered_type(&self, ty: TypeInfo) -> bool {
        self.registry.contains_key(&ty.id())
    }

    pub(crate) fn registration(&self, ty: TypeInfo) -> ValidationResult<Arc<Constraints>> {
        self.registry
            .get(&ty.id())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ValidatorError::unregistered(ty.simple_name()))
    }

    /// Validates `bean` and everything reachable through `valid` properties.
    ///
    /// Every bean is entered at most once per call, so cyclic graphs end.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Unregistered`] if the bean, or a nested bean
    /// reached by cascading, has no registered constraints.
    pub fn validate(&self, bean: &dyn Bean) -> ValidationResult<Errors> {
        let root = bean.bean_type();
        let visited = RefCell::new(HashSet::new());
        let errors = ValidationContext::root(self, root, &visited).check(bean, identity(bean))?;

        let name = root.simple_name();
        debug!(
            bean_type = %name,
            error_count = errors.error_count(),
            visited = visited.borrow().len(),
            "validated bean"
        );
        record_validation(&name, errors.error_count());
        Ok(errors)
    }

    /// Like [`validate`](Self::validate), rejecting an absent bean.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::NullBean`] for `None`, otherwise as `validate`.
    pub fn validate_option(&self, bean: Option<&dyn Bean>) -> ValidationResult<Errors> {
        bean.map_or(Err(ValidatorError::NullBean), |bean| self.validate(bean))
    }
}
