//! Core type definitions for recordkit.
//!
//! This crate holds the small, dependency-light types shared by the model
//! layer and anything that indexes records from the outside:
//! - [`Euid`] — the ephemeral per-instance identifier (random UUID v4)
//!
//! Domain-level identity (the primary key) lives inside a record's
//! attributes and is not modelled here.

mod ids;

pub use ids::Euid;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid euid: {0}")]
    InvalidEuid(#[from] uuid::Error),
}
