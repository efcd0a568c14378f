//! # mlcatalog - ML & Autonomy Technology Catalog
//!
//! A small relational catalog of organizations, the machine-learning and
//! autonomy technologies they ship, and related hardware/software artifacts.
//!
//! mlcatalog provides:
//! - Idempotent SQLite schema for six catalog tables
//! - A generic loader with explicit replace-by-key / ignore / append policies
//! - Built-in seed sets embedded from TOML
//! - Query engine for listings, keyword search and aggregate statistics

pub mod model;
pub mod storage;
pub mod loader;
pub mod seed;
pub mod query;
pub mod secrets;
pub mod ui;
pub mod output;
pub mod config;

// Re-exports for convenient access
pub use model::{Equipment, FlightControlSystem, Organization, Sensor, Technology, TechnologyCategory};
pub use storage::CatalogStore;
pub use loader::{CatalogLoader, LoadPolicy, LoadReport, Record, ReferenceCheck};
pub use query::QueryEngine;
pub use seed::SeedSet;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema missing: table '{0}' does not exist (run schema setup first)")]
    SchemaMissing(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    #[error("Batch rejected for '{table}' at record {index}: {source}")]
    BatchRejected {
        table: &'static str,
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Policy {policy} is not valid for '{table}' (no unique key)")]
    InvalidPolicy {
        table: &'static str,
        policy: LoadPolicy,
    },

    #[error("Unknown organizations referenced by '{table}': {}", names.join(", "))]
    DanglingReferences {
        table: &'static str,
        names: Vec<String>,
    },

    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error (or the cause of a rejected batch) is a constraint failure
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Error::ConstraintViolation(_) => true,
            Error::BatchRejected { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        storage::classify(err)
    }
}
