use super::Store;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Name → store lookup used to resolve [`StoreRef::Path`](super::StoreRef::Path).
///
/// Records use [`StoreRegistry::global`] unless a registry is injected through
/// their options.
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Arc<dyn Store>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static StoreRegistry {
        static GLOBAL: OnceLock<StoreRegistry> = OnceLock::new();
        GLOBAL.get_or_init(StoreRegistry::new)
    }

    /// Registers `store` under `path`, returning any store it replaces.
    pub fn register(&self, path: impl Into<String>, store: Arc<dyn Store>) -> Option<Arc<dyn Store>> {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), store)
    }

    pub fn unregister(&self, path: &str) -> Option<Arc<dyn Store>> {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    pub fn lookup(&self, path: &str) -> Option<Arc<dyn Store>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.stores.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<_> = stores.keys().collect();
        paths.sort();
        f.debug_struct("StoreRegistry").field("paths", &paths).finish()
    }
}
