//! Record kinds: named record types carrying a resolved schema and the
//! instance defaults (primary key, include keys, store) every record of the
//! kind starts from.

use crate::schema::{Schema, SchemaDecl};
use crate::store::StoreRef;
use crate::Attributes;
use std::sync::Arc;
use tracing::debug;

/// Default name of the primary key attribute.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// A record type.
///
/// Kinds are immutable once built. [`RecordKind::extend`] runs the schema
/// composer exactly once and yields a new kind; the parent is left as is.
#[derive(Debug, Clone)]
pub struct RecordKind {
    name: String,
    parent: Option<String>,
    schema: Schema,
    primary_key: String,
    include_keys: Option<Vec<String>>,
    store: Option<StoreRef>,
}

/// What a subtype declares when extending a kind.
#[derive(Debug, Clone, Default)]
pub struct KindDecl {
    pub name: String,
    pub schema: SchemaDecl,
    pub primary_key: Option<String>,
    pub include_keys: Option<Vec<String>>,
    pub store: Option<StoreRef>,
}

impl KindDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.schema.attributes = Some(attributes);
        self
    }

    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.schema.defaults = Some(defaults);
        self
    }

    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn include_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn store(mut self, store: StoreRef) -> Self {
        self.store = Some(store);
        self
    }
}

impl RecordKind {
    /// A root kind with an empty schema.
    pub fn base(name: impl Into<String>) -> Arc<Self> {
        Self::define(KindDecl::new(name))
    }

    /// A root kind whose schema is exactly what `decl` declares.
    pub fn define(mut decl: KindDecl) -> Arc<Self> {
        let schema = Schema::default().compose(&mut decl.schema);
        debug!(kind = %decl.name, "root kind defined");
        Arc::new(Self {
            name: decl.name,
            parent: None,
            schema,
            primary_key: decl
                .primary_key
                .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string()),
            include_keys: decl.include_keys,
            store: decl.store,
        })
    }

    /// Defines a subtype of `self`.
    ///
    /// The declared schema is merged over this kind's schema; undeclared
    /// instance defaults are inherited.
    pub fn extend(self: &Arc<Self>, mut decl: KindDecl) -> Arc<Self> {
        let schema = self.schema.compose(&mut decl.schema);
        debug!(
            kind = %decl.name,
            parent = %self.name,
            attributes = schema.attributes().len(),
            defaults = schema.defaults().len(),
            "kind defined"
        );
        Arc::new(Self {
            name: decl.name,
            parent: Some(self.name.clone()),
            schema,
            primary_key: decl.primary_key.unwrap_or_else(|| self.primary_key.clone()),
            include_keys: decl.include_keys.or_else(|| self.include_keys.clone()),
            store: decl.store.or_else(|| self.store.clone()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the kind this one extends, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn include_keys(&self) -> Option<&[String]> {
        self.include_keys.as_deref()
    }

    pub fn store(&self) -> Option<&StoreRef> {
        self.store.as_ref()
    }
}
