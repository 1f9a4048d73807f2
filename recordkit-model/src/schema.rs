//! Schema composition for record kinds.
//!
//! A [`Schema`] is resolved once per kind and never mutated afterwards.
//! Extending it produces a new schema; maps the extension does not touch are
//! shared with the parent instead of copied.

use crate::Attributes;
use std::sync::Arc;

/// The resolved attribute/default schema of a record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: Arc<Attributes>,
    defaults: Arc<Attributes>,
}

/// The attribute and default maps a subtype (or a configured instance)
/// declares on top of its parent's schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDecl {
    pub attributes: Option<Attributes>,
    pub defaults: Option<Attributes>,
}

impl SchemaDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// True when neither map is declared.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_none() && self.defaults.is_none()
    }
}

impl Schema {
    pub fn new(attributes: Attributes, defaults: Attributes) -> Self {
        Self {
            attributes: Arc::new(attributes),
            defaults: Arc::new(defaults),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn defaults(&self) -> &Attributes {
        &self.defaults
    }

    /// Merges `decl` over this schema and returns the child schema.
    ///
    /// Declared keys override inherited ones; every other inherited key
    /// survives. Each declared map is taken out of `decl` once absorbed. A map
    /// that is not declared is shared with `self` rather than cloned.
    pub fn compose(&self, decl: &mut SchemaDecl) -> Schema {
        Schema {
            attributes: merge(&self.attributes, decl.attributes.take()),
            defaults: merge(&self.defaults, decl.defaults.take()),
        }
    }

    /// Returns true if both schemas share the same attribute map allocation.
    pub fn shares_attributes_with(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.attributes, &other.attributes)
    }

    /// Returns true if both schemas share the same defaults map allocation.
    pub fn shares_defaults_with(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.defaults, &other.defaults)
    }
}

fn merge(parent: &Arc<Attributes>, declared: Option<Attributes>) -> Arc<Attributes> {
    match declared {
        Some(declared) => {
            let mut merged = Attributes::clone(parent);
            merged.mixin(&declared);
            Arc::new(merged)
        }
        None => Arc::clone(parent),
    }
}
