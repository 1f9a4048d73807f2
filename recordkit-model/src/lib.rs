//! Schema-flexible record model.
//!
//! - [`Record`] — a bag of named attributes with change tracking and
//!   computed (function-valued, read-only) attributes
//! - [`Attributes`] / [`Attribute`] — the attribute map and its entries
//! - [`Schema`] — the resolved attribute/default maps of a kind, composed
//!   top-down through the kind hierarchy without mutating ancestors
//! - [`RecordKind`] — a named record type
//! - [`Store`] — the collaborator records register with and route observer
//!   calls through; [`MemoryStore`] is the process-wide default
//! - [`Lifecycle`] — persistence hooks
//! - [`ModelConfig`] / [`KindCatalog`] — kinds declared in TOML

mod attribute;
mod config;
mod error;
mod kind;
mod lifecycle;
mod record;
mod schema;
pub mod store;

pub use attribute::{Attribute, Attributes, Computed};
pub use config::{KindCatalog, KindConfig, ModelConfig};
pub use error::{ModelError, ModelResult};
pub use kind::{DEFAULT_PRIMARY_KEY, KindDecl, RecordKind};
pub use lifecycle::Lifecycle;
pub use record::{Record, RecordOptions};
pub use recordkit_types::Euid;
pub use schema::{Schema, SchemaDecl};
pub use store::{
    ANY_ATTRIBUTE, MemoryStore, Observer, Store, StoreRef, StoreRegistry, default_store,
    set_default_store,
};
