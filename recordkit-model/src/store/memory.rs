use super::{Observer, Store};
use crate::Record;
use recordkit_types::Euid;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Observer name that matches every attribute.
pub const ANY_ATTRIBUTE: &str = "*";

/// In-memory store: indexes records by euid and primary key and keeps
/// per-record observer lists.
///
/// Notification fires each observer registered under a name written by the
/// record's most recent `set`/`set_object` call, then every [`ANY_ATTRIBUTE`] observer once. The
/// internal lock is released before any callback runs, so observers may call
/// back into the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<Euid, RecordEntry>,
    by_primary_key: HashMap<(String, String), Euid>,
    observers: HashMap<Euid, HashMap<String, Vec<Observer>>>,
    notifications: u64,
}

#[derive(Debug)]
struct RecordEntry {
    kind: String,
    primary_key: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, euid: &Euid) -> bool {
        self.state().records.contains_key(euid)
    }

    /// Looks up a record of `kind` by its primary key value.
    pub fn find_by_primary_key(&self, kind: &str, value: &Value) -> Option<Euid> {
        self.state()
            .by_primary_key
            .get(&(kind.to_string(), value.to_string()))
            .copied()
    }

    /// Number of observers registered on `euid` across all attribute names.
    pub fn observer_count(&self, euid: &Euid) -> usize {
        self.state()
            .observers
            .get(euid)
            .map_or(0, |by_name| by_name.values().map(Vec::len).sum())
    }

    /// Total number of `notify_model_observers` calls received.
    pub fn notification_count(&self) -> u64 {
        self.state().notifications
    }
}

fn primary_key_text(record: &Record) -> Option<String> {
    record.primary_key_value().map(|v| v.to_string())
}

impl StoreState {
    fn index(&mut self, euid: Euid, kind: &str, primary_key: Option<String>) {
        let previous = self.records.insert(
            euid,
            RecordEntry {
                kind: kind.to_string(),
                primary_key: primary_key.clone(),
            },
        );
        if let Some(old) = previous.and_then(|entry| entry.primary_key.map(|pk| (entry.kind, pk))) {
            if self.by_primary_key.get(&old) == Some(&euid) {
                self.by_primary_key.remove(&old);
            }
        }
        if let Some(pk) = primary_key {
            self.by_primary_key.insert((kind.to_string(), pk), euid);
        }
    }
}

impl Store for MemoryStore {
    fn add_record(&self, record: &Record) {
        let euid = *record.euid();
        let primary_key = primary_key_text(record);
        debug!(%euid, kind = record.kind(), primary_key = ?primary_key, "record registered");
        self.state().index(euid, record.kind(), primary_key);
    }

    fn remove_record(&self, record: &Record) {
        let euid = *record.euid();
        let mut state = self.state();
        if let Some(entry) = state.records.remove(&euid) {
            if let Some(pk) = entry.primary_key {
                let key = (entry.kind, pk);
                if state.by_primary_key.get(&key) == Some(&euid) {
                    state.by_primary_key.remove(&key);
                }
            }
        }
        state.observers.remove(&euid);
        debug!(%euid, "record removed");
    }

    fn add_model_observer(&self, record: &Record, name: &str, observer: Observer) {
        self.state()
            .observers
            .entry(*record.euid())
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(observer);
    }

    fn remove_model_observer(&self, record: &Record, name: &str, observer: &Observer) {
        let mut state = self.state();
        let Some(by_name) = state.observers.get_mut(record.euid()) else {
            return;
        };
        if let Some(list) = by_name.get_mut(name) {
            list.retain(|o| o != observer);
            if list.is_empty() {
                by_name.remove(name);
            }
        }
        if by_name.is_empty() {
            state.observers.remove(record.euid());
        }
    }

    fn notify_model_observers(&self, record: &Record) {
        let euid = *record.euid();
        let primary_key = record
            .last_written()
            .contains(record.primary_key())
            .then(|| primary_key_text(record));
        let pending: Vec<(Observer, String)> = {
            let mut state = self.state();
            state.notifications += 1;

            if let Some(primary_key) = primary_key {
                let stale = state
                    .records
                    .get(&euid)
                    .is_some_and(|entry| entry.primary_key != primary_key);
                if stale {
                    state.index(euid, record.kind(), primary_key);
                }
            }

            match state.observers.get(&euid) {
                Some(by_name) => {
                    let mut pending = Vec::new();
                    for name in record.last_written() {
                        if let Some(list) = by_name.get(name.as_str()) {
                            pending.extend(list.iter().map(|o| (o.clone(), name.clone())));
                        }
                    }
                    if let Some(list) = by_name.get(ANY_ATTRIBUTE) {
                        pending.extend(list.iter().map(|o| (o.clone(), ANY_ATTRIBUTE.to_string())));
                    }
                    pending
                }
                None => Vec::new(),
            }
        };

        for (observer, name) in pending {
            observer.call(record, &name);
        }
    }
}
