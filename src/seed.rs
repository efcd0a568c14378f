//! Built-in seed data
//!
//! Seed sets are plain TOML documents compiled into the binary. Each one
//! mirrors a historical "populate" or "extend" pass over the catalog and is
//! inserted verbatim.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::{CatalogLoader, LoadPolicy, LoadReport, Record};
use crate::model::{Equipment, FlightControlSystem, Organization, Sensor, Technology, TechnologyCategory};
use crate::{Error, Result};

/// Built-in seed sets, in the order `setup` applies them
pub const BUILTIN_SEEDS: &[(&str, &str)] = &[
    ("core", include_str!("../data/core.toml")),
    ("autonomy", include_str!("../data/autonomy.toml")),
    ("expansion", include_str!("../data/expansion.toml")),
];

fn default_organization_policy() -> LoadPolicy {
    LoadPolicy::ReplaceByKey
}

/// One batch of literal catalog records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSet {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Policy for organizations; categories always replace by key
    #[serde(default = "default_organization_policy")]
    pub organization_policy: LoadPolicy,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub categories: Vec<TechnologyCategory>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub flight_control_systems: Vec<FlightControlSystem>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl SeedSet {
    /// Parse a seed set from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Seed(e.to_string()))
    }

    /// Read a seed set from a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::Seed(format!("{}: {}", path.display(), e)))
    }

    /// Look up a built-in seed set by name
    pub fn builtin(name: &str) -> Result<Self> {
        BUILTIN_SEEDS
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| Error::Seed(format!("Unknown seed set: {}", name)))
            .and_then(|(_, contents)| Self::parse(contents))
    }

    /// All built-in seed sets
    pub fn all_builtin() -> Result<Vec<Self>> {
        BUILTIN_SEEDS
            .iter()
            .map(|(_, contents)| Self::parse(contents))
            .collect()
    }

    pub fn builtin_names() -> Vec<&'static str> {
        BUILTIN_SEEDS.iter().map(|(name, _)| *name).collect()
    }

    /// Total number of records across all tables
    pub fn record_count(&self) -> usize {
        self.organizations.len()
            + self.categories.len()
            + self.technologies.len()
            + self.equipment.len()
            + self.flight_control_systems.len()
            + self.sensors.len()
    }

    /// Load every non-empty table of the set, one transaction per table.
    ///
    /// Organizations go first so reference checks on technologies can see them.
    pub fn apply(&self, loader: &mut CatalogLoader<'_>) -> Result<Vec<LoadReport>> {
        tracing::info!("Applying seed set '{}' ({} records)", self.name, self.record_count());
        let mut reports = Vec::new();

        if !self.organizations.is_empty() {
            reports.push(loader.load(&self.organizations, self.organization_policy)?);
        }
        push_default(loader, &self.categories, &mut reports)?;
        push_default(loader, &self.technologies, &mut reports)?;
        push_default(loader, &self.equipment, &mut reports)?;
        push_default(loader, &self.flight_control_systems, &mut reports)?;
        push_default(loader, &self.sensors, &mut reports)?;

        Ok(reports)
    }
}

fn push_default<R: Record>(
    loader: &mut CatalogLoader<'_>,
    records: &[R],
    reports: &mut Vec<LoadReport>,
) -> Result<()> {
    if !records.is_empty() {
        reports.push(loader.load_default(records)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CatalogStore;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_seed_file_names_path_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "name = \"broken\"\n[[organizations]\n").unwrap();

        let err = SeedSet::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Seed(_)));
        let message = err.to_string();
        assert!(message.contains("broken.toml"), "{}", message);
        assert_eq!(message.matches("Seed error").count(), 1, "{}", message);
    }

    #[test]
    fn test_builtin_sets_parse() {
        let core = SeedSet::builtin("core").unwrap();
        assert_eq!(core.organizations.len(), 8);
        assert_eq!(core.categories.len(), 10);
        assert_eq!(core.technologies.len(), 20);
        assert_eq!(core.organization_policy, LoadPolicy::ReplaceByKey);

        let autonomy = SeedSet::builtin("autonomy").unwrap();
        assert_eq!(autonomy.organization_policy, LoadPolicy::IgnoreExisting);
        assert_eq!(autonomy.sensors.len(), 10);
        assert_eq!(autonomy.flight_control_systems.len(), 6);

        let expansion = SeedSet::builtin("expansion").unwrap();
        assert_eq!(expansion.organizations.len(), 30);
        assert!(expansion.sensors.is_empty());
    }

    #[test]
    fn test_unknown_set() {
        assert!(matches!(SeedSet::builtin("nope"), Err(Error::Seed(_))));
    }

    #[test]
    fn test_apply_twice_converges_reference_tables_only() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let core = SeedSet::builtin("core").unwrap();

        {
            let mut loader = CatalogLoader::new(&mut store);
            let reports = core.apply(&mut loader).unwrap();
            assert_eq!(reports.len(), 3);
            core.apply(&mut loader).unwrap();
        }

        assert_eq!(store.count_rows("companies").unwrap(), 8);
        assert_eq!(store.count_rows("technology_categories").unwrap(), 10);
        assert_eq!(store.count_rows("ml_technologies").unwrap(), 40);
    }

    #[test]
    fn test_parse_minimal_set() {
        let set = SeedSet::parse(
            r#"
            name = "custom"

            [[organizations]]
            company_name = "Acme"

            [[technologies]]
            company_name = "Acme"
            technology_name = "Widget AI"
            "#,
        )
        .unwrap();

        assert_eq!(set.organization_policy, LoadPolicy::ReplaceByKey);
        assert_eq!(set.record_count(), 2);
        assert!(set.organizations[0].industry.is_none());
    }
}
