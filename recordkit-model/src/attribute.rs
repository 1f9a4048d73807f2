use crate::{ModelError, Record};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;

type ComputeFn = dyn Fn(&Record) -> Value + Send + Sync;

/// A derived, read-only attribute value.
///
/// The function is invoked with the owning record every time the attribute
/// is read through [`Record::get`]. Two `Computed` values are equal only if
/// they share the same function allocation.
#[derive(Clone)]
pub struct Computed(Arc<ComputeFn>);

impl Computed {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluates the attribute against `record`.
    pub fn call(&self, record: &Record) -> Value {
        (self.0)(record)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Computed({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Computed {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One entry in a record's attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Plain data.
    Value(Value),
    /// Function-valued attribute; reads resolve it, writes are ignored.
    Computed(Computed),
}

impl Attribute {
    /// Creates a computed attribute from a closure.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Computed::new(f))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }

    /// Returns the plain value, or `None` for computed attributes.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Computed(_) => None,
        }
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Computed> for Attribute {
    fn from(computed: Computed) -> Self {
        Self::Computed(computed)
    }
}

/// A name → [`Attribute`] map with the merge helpers the schema composer and
/// record constructor rely on.
///
/// Serializing an `Attributes` map omits computed entries, the same way a
/// JSON encoder drops function-valued properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plain-valued map from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(ModelError::NotAnObject(json_kind(&other))),
        }
    }

    /// Inserts a plain value, returning `self` for builder-style use.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a computed attribute, returning `self` for builder-style use.
    pub fn with_computed<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.insert_computed(name, f);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Attribute> {
        self.0.insert(name.into(), Attribute::Value(value.into()))
    }

    pub fn insert_computed<F>(&mut self, name: impl Into<String>, f: F) -> Option<Attribute>
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.0.insert(name.into(), Attribute::computed(f))
    }

    pub fn insert_attribute(&mut self, name: impl Into<String>, attribute: Attribute) -> Option<Attribute> {
        self.0.insert(name.into(), attribute)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(Attribute::is_computed)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Attribute> {
        self.0.iter()
    }

    /// Copies every entry of `source` into `self`, overwriting collisions.
    pub fn mixin(&mut self, source: &Attributes) {
        for (k, v) in &source.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Copies entries of `source` whose names are not already present.
    pub fn mixin_missing(&mut self, source: &Attributes) {
        for (k, v) in &source.0 {
            self.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    /// Returns a new map holding only the named entries that exist here.
    pub fn only<S: AsRef<str>>(&self, keys: &[S]) -> Attributes {
        keys.iter()
            .filter_map(|k| {
                let k = k.as_ref();
                self.0.get(k).map(|v| (k.to_string(), v.clone()))
            })
            .collect()
    }

    /// Plain entries as a JSON object; computed entries are skipped.
    pub fn to_json_map(&self) -> serde_json::Map<String, Value> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_value().map(|v| (k.clone(), v.clone())))
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<K: Into<String>, V: Into<Attribute>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Attribute);
    type IntoIter = btree_map::IntoIter<String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = btree_map::Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let plain = self.0.iter().filter_map(|(k, v)| v.as_value().map(|v| (k, v)));
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in plain {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}
