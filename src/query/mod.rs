pub mod engine;

pub use engine::{CatalogSummary, OrganizationStats, QueryEngine, TypeCount};
