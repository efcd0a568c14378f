//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - companies(company_name UNIQUE, industry, country, founded_year, description)
//! - technology_categories(category_name UNIQUE, description)
//! - ml_technologies(company_name, technology_name, technology_type, ...)
//! - equipment(name, manufacturer, category, ...)
//! - flight_control_systems(name, type, open_source, ...)
//! - sensors(name, type, manufacturer, ...)

pub mod schema;
pub mod sqlite;

pub use sqlite::CatalogStore;
pub(crate) use sqlite::classify;
