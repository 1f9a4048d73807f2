//! The store contract records register with and route notifications through.
//!
//! Records own no observer state. Every observer call is forwarded to the
//! record's resolved [`Store`], which decides how to index records and when
//! to fire callbacks. [`MemoryStore`] is the process-wide default.

mod memory;
mod registry;

pub use memory::{ANY_ATTRIBUTE, MemoryStore};
pub use registry::StoreRegistry;

use crate::{ModelError, Record};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Operations a store exposes to the records it owns.
pub trait Store: Send + Sync {
    /// Called once per record, after its euid and attributes are in place.
    fn add_record(&self, record: &Record);

    /// Called when a record is dropped or moves to another store. The store
    /// should forget the record and its observers.
    fn remove_record(&self, record: &Record) {
        let _ = record;
    }

    /// Registers `observer` for changes to attribute `name` of `record`.
    fn add_model_observer(&self, record: &Record, name: &str, observer: Observer);

    /// Removes a previously added observer. Unknown observers are ignored.
    fn remove_model_observer(&self, record: &Record, name: &str, observer: &Observer);

    /// Dispatches notifications for the attributes named in
    /// `record.last_written()`.
    fn notify_model_observers(&self, record: &Record);
}

type ObserverFn = dyn Fn(&Record, &str) + Send + Sync;

/// A change callback, invoked with the record and the attribute name.
///
/// Any context the callback needs is captured by the closure. Two observers
/// are equal when they are clones of the same callback.
#[derive(Clone)]
pub struct Observer(Arc<ObserverFn>);

impl Observer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record, &str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, record: &Record, name: &str) {
        (self.0)(record, name)
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observer({:p})", Arc::as_ptr(&self.0))
    }
}

/// How a kind or record names its store before resolution.
#[derive(Clone)]
pub enum StoreRef {
    /// A concrete store.
    Instance(Arc<dyn Store>),
    /// A name looked up in a [`StoreRegistry`].
    Path(String),
}

impl StoreRef {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }
}

impl From<Arc<dyn Store>> for StoreRef {
    fn from(store: Arc<dyn Store>) -> Self {
        Self::Instance(store)
    }
}

impl fmt::Debug for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(store) => write!(f, "Instance({:p})", Arc::as_ptr(store)),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

static DEFAULT_STORE: OnceLock<Arc<dyn Store>> = OnceLock::new();

/// Returns the process-wide default store, creating a [`MemoryStore`] on
/// first use. The default is never torn down.
pub fn default_store() -> Arc<dyn Store> {
    Arc::clone(DEFAULT_STORE.get_or_init(|| Arc::new(MemoryStore::new())))
}

/// Installs the process-wide default store.
///
/// Must run before the first record is constructed without an explicit
/// store; fails if a default already exists.
pub fn set_default_store(store: Arc<dyn Store>) -> Result<(), ModelError> {
    DEFAULT_STORE
        .set(store)
        .map_err(|_| ModelError::DefaultStoreInitialized)
}
