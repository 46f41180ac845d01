//! Bean property access.
//!
//! A bean is a plain struct whose fields are reachable by name through the
//! [`Bean`] trait. `#[derive(Bean)]` writes the accessors; nothing here
//! relies on runtime reflection.
//!
//! Cyclic graphs are built from [`Shared`] nodes. Their identity is the
//! address and type of the locked value, which is what validation uses to
//! detect re-entry.

use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::field::Field;
use crate::types::TypeInfo;

/// Named property access for a bindable, validatable struct.
pub trait Bean: Any + Send + Sync {
    /// Returns the concrete bean type.
    fn bean_type(&self) -> TypeInfo;

    /// Returns the property names in declaration order.
    fn property_names(&self) -> Vec<&'static str>;

    /// Returns a property by name.
    fn field(&self, name: &str) -> Option<&dyn Field>;

    /// Returns a property by name for mutation.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Field>;

    /// Returns `self` as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as mutable `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Static side of [`Bean`].
pub trait BeanType: Bean + Sized {
    /// Property names without needing an instance.
    fn properties() -> Vec<&'static str>;

    /// The no-argument constructor, or `None` if the type has none.
    fn new_instance() -> Option<Self>;
}

/// Identity of a bean within a graph.
///
/// A struct and its first field may share an address, so the concrete type
/// is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeanId {
    address: usize,
    type_id: TypeId,
}

/// Returns the identity of a bean: the address of its data and its type.
#[must_use]
pub fn identity(bean: &dyn Bean) -> BeanId {
    BeanId {
        address: (bean as *const dyn Bean).cast::<()>() as usize,
        type_id: bean.as_any().type_id(),
    }
}

/// A bean node that can take part in a cyclic graph.
pub type Shared<B> = Arc<RwLock<B>>;

/// Wraps a bean into a [`Shared`] node.
pub fn shared<B: Bean>(bean: B) -> Shared<B> {
    Arc::new(RwLock::new(bean))
}

/// Read access to a bean that may sit behind a lock.
pub enum BeanRef<'a> {
    /// Plain reference
    Borrowed(&'a dyn Bean),
    /// Read guard of a [`Shared`] node
    Locked(MappedRwLockReadGuard<'a, dyn Bean>),
}

impl Deref for BeanRef<'_> {
    type Target = dyn Bean;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(bean) => &**bean,
            Self::Locked(guard) => &**guard,
        }
    }
}

/// Write access to a bean that may sit behind a lock.
pub enum BeanMut<'a> {
    /// Plain mutable reference
    Borrowed(&'a mut dyn Bean),
    /// Write guard of a [`Shared`] node
    Locked(MappedRwLockWriteGuard<'a, dyn Bean>),
}

impl Deref for BeanMut<'_> {
    type Target = dyn Bean;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(bean) => &**bean,
            Self::Locked(guard) => &**guard,
        }
    }
}

impl DerefMut for BeanMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Borrowed(bean) => &mut **bean,
            Self::Locked(guard) => &mut **guard,
        }
    }
}

/// Type-erased view of a locked bean node.
pub trait SharedBean: Send + Sync {
    /// Identity of the locked bean, available without taking the lock.
    fn identity(&self) -> BeanId;

    /// Takes a read lock. Recursive, so a thread already reading the
    /// node does not deadlock.
    fn read_bean(&self) -> BeanRef<'_>;

    /// Takes the write lock if nobody else holds the node.
    fn try_write_bean(&self) -> Option<BeanMut<'_>>;
}

impl<B: Bean> SharedBean for RwLock<B> {
    fn identity(&self) -> BeanId {
        BeanId {
            address: self.data_ptr() as usize,
            type_id: TypeId::of::<B>(),
        }
    }

    fn read_bean(&self) -> BeanRef<'_> {
        BeanRef::Locked(RwLockReadGuard::map(self.read_recursive(), |b| b as &dyn Bean))
    }

    fn try_write_bean(&self) -> Option<BeanMut<'_>> {
        self.try_write()
            .map(|guard| BeanMut::Locked(RwLockWriteGuard::map(guard, |b| b as &mut dyn Bean)))
    }
}

/// A bean reached while walking a graph.
#[derive(Clone, Copy)]
pub enum BeanHandle<'a> {
    /// Owned by its parent
    Borrowed(&'a dyn Bean),
    /// Held in a [`Shared`] node
    Shared(&'a dyn SharedBean),
}

impl<'a> BeanHandle<'a> {
    /// Identity of the referenced bean.
    #[must_use]
    pub fn identity(&self) -> BeanId {
        match self {
            Self::Borrowed(bean) => identity(*bean),
            Self::Shared(node) => node.identity(),
        }
    }

    /// Read access to the referenced bean.
    #[must_use]
    pub fn read(&self) -> BeanRef<'a> {
        match *self {
            Self::Borrowed(bean) => BeanRef::Borrowed(bean),
            Self::Shared(node) => node.read_bean(),
        }
    }
}
