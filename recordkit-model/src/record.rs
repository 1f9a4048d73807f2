use crate::kind::RecordKind;
use crate::lifecycle::Lifecycle;
use crate::schema::{Schema, SchemaDecl};
use crate::store::{Observer, Store, StoreRef, StoreRegistry, default_store};
use crate::{Attribute, Attributes, ModelResult};
use recordkit_types::Euid;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Instance-level overrides applied when a record is constructed.
///
/// Schema maps are composed over the kind's schema for this instance only;
/// every other field that is set replaces the kind's value.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub schema: SchemaDecl,
    pub store: Option<StoreRef>,
    pub primary_key: Option<String>,
    pub include_keys: Option<Vec<String>>,
    pub euid: Option<Euid>,
    pub registry: Option<Arc<StoreRegistry>>,
}

impl RecordOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.schema.attributes = Some(attributes);
        self
    }

    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.schema.defaults = Some(defaults);
        self
    }

    pub fn store(mut self, store: StoreRef) -> Self {
        self.store = Some(store);
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

    pub fn euid(mut self, euid: Euid) -> Self {
        self.euid = Some(euid);
        self
    }

    pub fn registry(mut self, registry: Arc<StoreRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// A schema-less bag of named attributes with change tracking.
///
/// Reads resolve computed attributes; writes to computed attributes are
/// ignored. Every write records the prior value in [`previous`](Self::previous)
/// and the new value in [`changed`](Self::changed), then asks the store to
/// notify observers. Writes take `&mut self`, so the capture/write/notify
/// sequence of one call never interleaves with another write to the same
/// record.
pub struct Record {
    kind: Arc<RecordKind>,
    schema: Schema,
    euid: Euid,
    attributes: Attributes,
    changed: Map<String, Value>,
    previous: BTreeMap<String, Option<Value>>,
    last_written: BTreeSet<String>,
    primary_key: String,
    include_keys: Option<Vec<String>>,
    store_ref: Option<StoreRef>,
    registry: Option<Arc<StoreRegistry>>,
    store: Arc<dyn Store>,
}

impl Record {
    /// Creates a record of `kind` with the given initial attributes.
    pub fn new(kind: &Arc<RecordKind>, attributes: Option<Attributes>) -> Self {
        Self::with_options(kind, attributes, RecordOptions::default())
    }

    /// Creates a record with instance-level overrides.
    ///
    /// The working attribute set is the effective schema's attributes, then
    /// `attributes` over them, then the schema defaults for keys still
    /// missing. The record is registered with its store once the set is
    /// assembled.
    pub fn with_options(
        kind: &Arc<RecordKind>,
        attributes: Option<Attributes>,
        mut options: RecordOptions,
    ) -> Self {
        let schema = if options.schema.is_empty() {
            kind.schema().clone()
        } else {
            kind.schema().compose(&mut options.schema)
        };

        let store_ref = options.store.or_else(|| kind.store().cloned());
        let store = resolve_store(store_ref.as_ref(), options.registry.as_deref());

        let mut working = schema.attributes().clone();
        if let Some(attributes) = &attributes {
            working.mixin(attributes);
        }
        working.mixin_missing(schema.defaults());

        let record = Self {
            kind: Arc::clone(kind),
            schema,
            euid: options.euid.unwrap_or_default(),
            attributes: working,
            changed: Map::new(),
            previous: BTreeMap::new(),
            last_written: BTreeSet::new(),
            primary_key: options
                .primary_key
                .unwrap_or_else(|| kind.primary_key().to_string()),
            include_keys: options.include_keys.or_else(|| kind.include_keys().map(<[String]>::to_vec)),
            store_ref,
            registry: options.registry,
            store,
        };
        record.store.add_record(&record);
        record
    }

    /// Returns the value of `name`, evaluating computed attributes.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.attributes.get(name)? {
            Attribute::Value(value) => Some(value.clone()),
            Attribute::Computed(computed) => Some(computed.call(self)),
        }
    }

    /// Sets one attribute and notifies observers.
    ///
    /// A computed attribute is left untouched and no notification is sent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.last_written.clear();
        if self.write(name.into(), value.into()) {
            self.notify_observers();
        }
        self
    }

    /// Sets every entry of `props`, skipping computed attributes, then
    /// notifies observers once for the whole batch.
    pub fn set_object<I, K, V>(&mut self, props: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.last_written.clear();
        for (name, value) in props {
            self.write(name.into(), value.into());
        }
        self.notify_observers();
        self
    }

    fn write(&mut self, name: String, value: Value) -> bool {
        let before = match self.attributes.get(&name) {
            Some(Attribute::Computed(_)) => {
                debug!(euid = %self.euid, attribute = %name, "write to computed attribute ignored");
                return false;
            }
            Some(Attribute::Value(v)) => Some(v.clone()),
            None => None,
        };
        self.previous.insert(name.clone(), before);
        self.changed.insert(name.clone(), value.clone());
        self.last_written.insert(name.clone());
        self.attributes.insert(name, value);
        true
    }

    /// Snapshot of the attributes, limited to the include keys when set.
    ///
    /// Values are raw: computed attributes appear as-is, unevaluated. The
    /// snapshot is an independent copy.
    pub fn raw(&self) -> Attributes {
        match &self.include_keys {
            Some(keys) => self.attributes.only(keys),
            None => self.attributes.clone(),
        }
    }

    /// JSON text of [`raw`](Self::raw). Computed attributes are omitted.
    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(&self.raw())?)
    }

    /// Re-resolves the configured store and registers with it.
    ///
    /// Resolution order: explicit instance, then a registry path, then the
    /// process-wide default. An unknown path logs a warning and falls back
    /// to the default. A store the record leaves is told to forget it.
    pub fn store_changed(&mut self) {
        let store = resolve_store(self.store_ref.as_ref(), self.registry.as_deref());
        if !Arc::ptr_eq(&self.store, &store) {
            self.store.remove_record(self);
        }
        self.store = store;
        self.store.add_record(self);
    }

    /// Points the record at a different store and registers with it.
    pub fn set_store(&mut self, store: StoreRef) {
        self.store_ref = Some(store);
        self.store_changed();
    }

    pub fn add_observer(&self, name: &str, observer: Observer) {
        self.store.add_model_observer(self, name, observer);
    }

    pub fn remove_observer(&self, name: &str, observer: &Observer) {
        self.store.remove_model_observer(self, name, observer);
    }

    pub fn notify_observers(&self) {
        self.store.notify_model_observers(self);
    }

    /// Clears the change set. Intended for the observer layer, which owns
    /// the reset policy; the record never calls this itself.
    pub fn clear_changed(&mut self) {
        self.changed.clear();
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The stored attribute, without evaluating computed values.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attributes written since the change set was last cleared.
    pub fn changed(&self) -> &Map<String, Value> {
        &self.changed
    }

    /// Names written by the most recent `set`/`set_object` call. Computed
    /// attributes skipped by that call are not included.
    pub fn last_written(&self) -> &BTreeSet<String> {
        &self.last_written
    }

    /// Value each written attribute held before its most recent write.
    /// `None` means the attribute did not exist.
    pub fn previous(&self) -> &BTreeMap<String, Option<Value>> {
        &self.previous
    }

    pub fn euid(&self) -> &Euid {
        &self.euid
    }

    /// Name of the primary key attribute.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn primary_key_value(&self) -> Option<Value> {
        self.get(&self.primary_key)
    }

    pub fn include_keys(&self) -> Option<&[String]> {
        self.include_keys.as_deref()
    }

    /// Name of the record's kind.
    pub fn kind(&self) -> &str {
        self.kind.name()
    }

    /// The effective schema, including instance-level overrides.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}

impl Lifecycle for Record {}

impl Drop for Record {
    fn drop(&mut self) {
        self.store.remove_record(self);
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("kind", &self.kind.name())
            .field("euid", &self.euid)
            .field("primary_key", &self.primary_key)
            .field("attributes", &self.attributes)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

fn resolve_store(store: Option<&StoreRef>, registry: Option<&StoreRegistry>) -> Arc<dyn Store> {
    match store {
        Some(StoreRef::Instance(store)) => Arc::clone(store),
        Some(StoreRef::Path(path)) => {
            let registry = registry.unwrap_or_else(|| StoreRegistry::global());
            registry.lookup(path).unwrap_or_else(|| {
                warn!(path = %path, "could not find the requested store, using the default store");
                default_store()
            })
        }
        None => default_store(),
    }
}
