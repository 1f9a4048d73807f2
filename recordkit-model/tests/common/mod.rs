#![allow(dead_code)]

use recordkit_model::{Euid, Observer, Record, Store};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// Store that records every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    pub added: Mutex<Vec<(Euid, Option<Value>)>>,
    pub removed: Mutex<Vec<Euid>>,
    pub notifications: Mutex<Vec<Map<String, Value>>>,
    pub observers: Mutex<Vec<(String, Observer)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn added_count(&self) -> usize {
        self.added.lock().unwrap().len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.lock().unwrap().len()
    }
}

impl Store for RecordingStore {
    fn add_record(&self, record: &Record) {
        self.added
            .lock()
            .unwrap()
            .push((*record.euid(), record.primary_key_value()));
    }

    fn remove_record(&self, record: &Record) {
        self.removed.lock().unwrap().push(*record.euid());
    }

    fn add_model_observer(&self, _record: &Record, name: &str, observer: Observer) {
        self.observers.lock().unwrap().push((name.to_string(), observer));
    }

    fn remove_model_observer(&self, _record: &Record, name: &str, observer: &Observer) {
        self.observers
            .lock()
            .unwrap()
            .retain(|(n, o)| !(n == name && o == observer));
    }

    fn notify_model_observers(&self, record: &Record) {
        self.notifications.lock().unwrap().push(record.changed().clone());
    }
}

/// Wraps a concrete store as the trait object records expect.
pub fn as_store<S: Store + 'static>(store: &Arc<S>) -> Arc<dyn Store> {
    store.clone()
}
