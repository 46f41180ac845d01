//! The binding cursor.

use trellis_core::{join_path, TypeInfo};
use trellis_params::Params;

/// Where the binder currently is: root type, leaf type, dotted path and the
/// parameter subtree that applies to the leaf.
///
/// Cursors are cheap and never mutated; [`update`](Self::update) returns a
/// new one for the next level down.
#[derive(Debug, Clone)]
pub struct BindingContext<'a> {
    root_type: TypeInfo,
    leaf_type: TypeInfo,
    path: String,
    params: &'a Params,
}

impl<'a> BindingContext<'a> {
    /// A cursor at the root bean.
    #[must_use]
    pub fn root(root_type: TypeInfo, params: &'a Params) -> Self {
        Self {
            root_type,
            leaf_type: root_type,
            path: String::new(),
            params,
        }
    }

    /// A cursor one level down, at `path`.
    #[must_use]
    pub fn update(&self, leaf_type: TypeInfo, path: impl Into<String>, params: &'a Params) -> Self {
        Self {
            root_type: self.root_type,
            leaf_type,
            path: path.into(),
            params,
        }
    }

    /// Type of the bean binding started from.
    #[must_use]
    pub fn root_type(&self) -> TypeInfo {
        self.root_type
    }

    /// Type of the bean being populated.
    #[must_use]
    pub fn leaf_type(&self) -> TypeInfo {
        self.leaf_type
    }

    /// Dotted path of the leaf; empty at the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Dotted path of a property of the leaf.
    #[must_use]
    pub fn property_path(&self, name: &str) -> String {
        join_path(&self.path, name)
    }

    /// Parameters that apply to the leaf.
    #[must_use]
    pub fn params(&self) -> &'a Params {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;
    struct Line;

    #[test]
    fn test_update_returns_new_cursor() {
        let params = Params::parse("lines[0].qty=2").unwrap();
        let root = BindingContext::root(TypeInfo::of::<Order>(), &params);
        assert_eq!(root.path(), "");
        assert_eq!(root.property_path("lines"), "lines");

        let nested = Params::parse("qty=2").unwrap();
        let child = root.update(TypeInfo::of::<Line>(), "lines[0]", &nested);
        assert_eq!(child.path(), "lines[0]");
        assert_eq!(child.property_path("qty"), "lines[0].qty");
        assert_eq!(child.root_type(), TypeInfo::of::<Order>());
        assert_eq!(child.leaf_type(), TypeInfo::of::<Line>());

        assert_eq!(root.leaf_type(), TypeInfo::of::<Order>());
        assert_eq!(root.path(), "");
    }
}
