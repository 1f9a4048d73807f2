//! Kind declarations loaded from TOML.
//!
//! ```toml
//! [[kinds]]
//! name = "contact"
//! primary_key = "email"
//!
//! [kinds.defaults]
//! active = true
//!
//! [[kinds]]
//! name = "customer"
//! extends = "contact"
//! include_keys = ["email", "tier"]
//! store = "crm"
//!
//! [kinds.attributes]
//! tier = "basic"
//! ```
//!
//! A kind may only extend a kind declared earlier in the file. `store` is a
//! path resolved through a [`StoreRegistry`](crate::StoreRegistry) when
//! records are built.

use crate::kind::{KindDecl, RecordKind};
use crate::schema::SchemaDecl;
use crate::store::StoreRef;
use crate::{Attributes, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub kinds: Vec<KindConfig>,
}

/// One `[[kinds]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Attributes>,
}

impl ModelConfig {
    pub fn from_toml_str(contents: &str) -> ModelResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    pub fn load_from(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), kinds = config.kinds.len(), "loaded model config");
        Ok(config)
    }
}

impl From<&KindConfig> for KindDecl {
    fn from(config: &KindConfig) -> Self {
        KindDecl {
            name: config.name.clone(),
            schema: SchemaDecl {
                attributes: config.attributes.clone(),
                defaults: config.defaults.clone(),
            },
            primary_key: config.primary_key.clone(),
            include_keys: config.include_keys.clone(),
            store: config.store.clone().map(StoreRef::Path),
        }
    }
}

/// Record kinds indexed by name, in definition order.
#[derive(Debug, Default)]
pub struct KindCatalog {
    order: Vec<String>,
    kinds: HashMap<String, Arc<RecordKind>>,
}

impl KindCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every kind in `config`, composing each over its parent.
    pub fn from_config(config: &ModelConfig) -> ModelResult<Self> {
        let mut catalog = Self::new();
        for entry in &config.kinds {
            let decl = KindDecl::from(entry);
            let kind = match &entry.extends {
                Some(parent) => {
                    let parent = catalog.get(parent).ok_or_else(|| ModelError::UnknownParent {
                        kind: entry.name.clone(),
                        parent: parent.clone(),
                    })?;
                    parent.extend(decl)
                }
                None => RecordKind::define(decl),
            };
            catalog.insert(kind)?;
        }
        Ok(catalog)
    }

    /// Adds a kind. Names must be unique.
    pub fn insert(&mut self, kind: Arc<RecordKind>) -> ModelResult<()> {
        let name = kind.name().to_string();
        if self.kinds.contains_key(&name) {
            return Err(ModelError::DuplicateKind(name));
        }
        self.order.push(name.clone());
        self.kinds.insert(name, kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<RecordKind>> {
        self.kinds.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Kind names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
