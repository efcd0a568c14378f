//! Catalog Loader
//!
//! Writes batches of records into the catalog under an explicit dedup policy.
//! Reference tables (organizations, categories) converge to one row per key;
//! fact tables (technologies, equipment, flight control systems, sensors)
//! accumulate, so re-running a load duplicates its batch.
//!
//! Every batch runs inside one transaction: either all of its records are
//! written or none are.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

use crate::model::{Equipment, FlightControlSystem, Organization, Sensor, Technology, TechnologyCategory};
use crate::storage::schema;
use crate::storage::{classify, CatalogStore};
use crate::{Error, Result};

/// How a batch treats records whose unique key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPolicy {
    /// Overwrite every non-key column of the existing row, keeping its id
    ReplaceByKey,
    /// Keep the existing row and skip the incoming one
    IgnoreExisting,
    /// Insert unconditionally, no existence check
    AppendOnly,
}

impl LoadPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPolicy::ReplaceByKey => "replace-by-key",
            LoadPolicy::IgnoreExisting => "ignore-existing",
            LoadPolicy::AppendOnly => "append-only",
        }
    }
}

impl fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoadPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "replace-by-key" | "replace" => Ok(LoadPolicy::ReplaceByKey),
            "ignore-existing" | "ignore" => Ok(LoadPolicy::IgnoreExisting),
            "append-only" | "append" => Ok(LoadPolicy::AppendOnly),
            _ => Err(Error::InvalidValue(format!("Unknown load policy: {}", s))),
        }
    }
}

/// Optional check that records name organizations present in `companies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceCheck {
    /// Load without looking at `companies`
    #[default]
    Off,
    /// Log unknown organizations and report them, but still write the batch
    Warn,
    /// Reject the batch before writing if any organization is unknown
    Deny,
}

impl FromStr for ReferenceCheck {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Ok(ReferenceCheck::Off),
            "warn" => Ok(ReferenceCheck::Warn),
            "deny" | "strict" => Ok(ReferenceCheck::Deny),
            _ => Err(Error::InvalidValue(format!("Unknown reference check: {}", s))),
        }
    }
}

/// A loadable catalog entity.
///
/// `COLUMNS` lists the columns the loader supplies; `id` and `created_at` are
/// left to the storage engine.
pub trait Record {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column carrying the table's uniqueness invariant, if any
    const KEY: Option<&'static str> = None;
    const DEFAULT_POLICY: LoadPolicy = LoadPolicy::AppendOnly;

    /// Values bound to `COLUMNS`, in the same order
    fn values(&self) -> Vec<&dyn ToSql>;

    /// Organization this record refers to by name
    fn organization_ref(&self) -> Option<&str> {
        None
    }
}

impl Record for Organization {
    const TABLE: &'static str = schema::COMPANIES;
    const COLUMNS: &'static [&'static str] =
        &["company_name", "industry", "country", "founded_year", "description"];
    const KEY: Option<&'static str> = Some("company_name");
    const DEFAULT_POLICY: LoadPolicy = LoadPolicy::ReplaceByKey;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.company_name as &dyn ToSql,
            &self.industry,
            &self.country,
            &self.founded_year,
            &self.description,
        ]
    }
}

impl Record for TechnologyCategory {
    const TABLE: &'static str = schema::TECHNOLOGY_CATEGORIES;
    const COLUMNS: &'static [&'static str] = &["category_name", "description"];
    const KEY: Option<&'static str> = Some("category_name");
    const DEFAULT_POLICY: LoadPolicy = LoadPolicy::ReplaceByKey;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.category_name as &dyn ToSql, &self.description]
    }
}

impl Record for Technology {
    const TABLE: &'static str = schema::ML_TECHNOLOGIES;
    const COLUMNS: &'static [&'static str] = &[
        "company_name",
        "technology_name",
        "technology_type",
        "application_area",
        "description",
        "implementation_date",
        "source",
    ];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.company_name as &dyn ToSql,
            &self.technology_name,
            &self.technology_type,
            &self.application_area,
            &self.description,
            &self.implementation_date,
            &self.source,
        ]
    }

    fn organization_ref(&self) -> Option<&str> {
        Some(&self.company_name)
    }
}

impl Record for Equipment {
    const TABLE: &'static str = schema::EQUIPMENT;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "manufacturer",
        "category",
        "description",
        "specifications",
        "supported_software",
        "price_range",
        "availability",
    ];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name as &dyn ToSql,
            &self.manufacturer,
            &self.category,
            &self.description,
            &self.specifications,
            &self.supported_software,
            &self.price_range,
            &self.availability,
        ]
    }
}

impl Record for FlightControlSystem {
    const TABLE: &'static str = schema::FLIGHT_CONTROL_SYSTEMS;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "type",
        "description",
        "features",
        "supported_hardware",
        "open_source",
        "community_support",
        "documentation_url",
    ];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name as &dyn ToSql,
            &self.system_type,
            &self.description,
            &self.features,
            &self.supported_hardware,
            &self.open_source,
            &self.community_support,
            &self.documentation_url,
        ]
    }
}

impl Record for Sensor {
    const TABLE: &'static str = schema::SENSORS;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "type",
        "manufacturer",
        "specifications",
        "accuracy",
        "range",
        "power_consumption",
        "interface",
    ];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name as &dyn ToSql,
            &self.sensor_type,
            &self.manufacturer,
            &self.specifications,
            &self.accuracy,
            &self.range,
            &self.power_consumption,
            &self.interface,
        ]
    }
}

/// Outcome of one committed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub table: &'static str,
    pub policy: LoadPolicy,
    /// Records supplied by the caller
    pub attempted: usize,
    /// Rows inserted or overwritten (ignored duplicates excluded)
    pub written: usize,
    /// Organizations named by the batch but absent from `companies`
    pub dangling: Vec<String>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} written ({})",
            self.table, self.written, self.attempted, self.policy
        )?;
        if !self.dangling.is_empty() {
            write!(f, ", unknown organizations: {}", self.dangling.join(", "))?;
        }
        Ok(())
    }
}

/// Generic batch loader over a borrowed store
pub struct CatalogLoader<'a> {
    store: &'a mut CatalogStore,
    reference_check: ReferenceCheck,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(store: &'a mut CatalogStore) -> Self {
        Self {
            store,
            reference_check: ReferenceCheck::Off,
        }
    }

    pub fn with_reference_check(mut self, check: ReferenceCheck) -> Self {
        self.reference_check = check;
        self
    }

    /// Load a batch using the record type's default policy
    pub fn load_default<R: Record>(&mut self, records: &[R]) -> Result<LoadReport> {
        self.load(records, R::DEFAULT_POLICY)
    }

    /// Load a batch atomically under `policy`.
    ///
    /// On any failure while writing, the transaction is rolled back and
    /// `BatchRejected` names the first failing record.
    pub fn load<R: Record>(&mut self, records: &[R], policy: LoadPolicy) -> Result<LoadReport> {
        let sql = insert_statement::<R>(policy)?;

        let dangling = match self.reference_check {
            ReferenceCheck::Off => Vec::new(),
            check => {
                let dangling = self.dangling_references(records)?;
                if !dangling.is_empty() {
                    if check == ReferenceCheck::Deny {
                        return Err(Error::DanglingReferences {
                            table: R::TABLE,
                            names: dangling,
                        });
                    }
                    tracing::warn!(
                        "{} references unknown organizations: {}",
                        R::TABLE,
                        dangling.join(", ")
                    );
                }
                dangling
            }
        };

        let tx = self.store.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (index, record) in records.iter().enumerate() {
                let values = record.values();
                written += stmt.execute(values.as_slice()).map_err(|err| {
                    let cause = classify(err);
                    tracing::warn!("Rejecting {} batch at record {}: {}", R::TABLE, index, cause);
                    Error::BatchRejected {
                        table: R::TABLE,
                        index,
                        source: Box::new(cause),
                    }
                })?;
            }
        }
        tx.commit()?;

        let report = LoadReport {
            table: R::TABLE,
            policy,
            attempted: records.len(),
            written,
            dangling,
        };
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Distinct organization names referenced by `records` that have no row in `companies`
    pub fn dangling_references<R: Record>(&self, records: &[R]) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = records.iter().filter_map(|r| r.organization_ref()).collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.store.connection();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM companies WHERE company_name = ?1")?;
        let mut dangling = Vec::new();
        for name in names {
            let count: i64 = stmt.query_row([name], |row| row.get(0))?;
            if count == 0 {
                dangling.push(name.to_string());
            }
        }
        Ok(dangling)
    }
}

/// Build the insert statement for `R` under `policy`
fn insert_statement<R: Record>(policy: LoadPolicy) -> Result<String> {
    let columns: Vec<String> = R::COLUMNS.iter().map(|c| quote(c)).collect();
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    let target = format!(
        "INTO {} ({}) VALUES ({})",
        R::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    );

    match (policy, R::KEY) {
        (LoadPolicy::AppendOnly, _) => Ok(format!("INSERT {}", target)),
        (LoadPolicy::IgnoreExisting, Some(_)) => Ok(format!("INSERT OR IGNORE {}", target)),
        (LoadPolicy::ReplaceByKey, Some(key)) => {
            let updates: Vec<String> = R::COLUMNS
                .iter()
                .filter(|c| **c != key)
                .map(|c| format!("{0} = excluded.{0}", quote(c)))
                .collect();
            let action = if updates.is_empty() {
                "DO NOTHING".to_string()
            } else {
                format!("DO UPDATE SET {}", updates.join(", "))
            };
            Ok(format!("INSERT {} ON CONFLICT({}) {}", target, quote(key), action))
        }
        (policy, None) => Err(Error::InvalidPolicy {
            table: R::TABLE,
            policy,
        }),
    }
}

fn quote(column: &str) -> String {
    format!("\"{}\"", column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CatalogStore {
        let store = CatalogStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn org_description(store: &CatalogStore, name: &str) -> (i64, Option<String>) {
        store
            .connection()
            .query_row(
                "SELECT id, description FROM companies WHERE company_name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap()
    }

    #[test]
    fn test_replace_statement_updates_non_key_columns() {
        let sql = insert_statement::<TechnologyCategory>(LoadPolicy::ReplaceByKey).unwrap();
        assert!(sql.contains("ON CONFLICT(\"category_name\")"));
        assert!(sql.contains("\"description\" = excluded.\"description\""));
        assert!(!sql.contains("\"category_name\" = excluded"));
    }

    #[test]
    fn test_keyed_policy_rejected_for_append_only_table() {
        let err = insert_statement::<Technology>(LoadPolicy::ReplaceByKey).unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy { table: "ml_technologies", .. }));
    }

    #[test]
    fn test_replace_by_key_converges_and_keeps_id() {
        let mut store = store();
        let mut loader = CatalogLoader::new(&mut store);

        loader
            .load_default(&[Organization::new("Acme", "Tech", "USA", 2020, "first")])
            .unwrap();
        let report = loader
            .load_default(&[Organization::new("Acme", "Robotics", "USA", 2020, "second")])
            .unwrap();
        assert_eq!(report.written, 1);

        assert_eq!(store.count_rows("companies").unwrap(), 1);
        let (id, description) = org_description(&store, "Acme");
        assert_eq!(id, 1);
        assert_eq!(description.as_deref(), Some("second"));
    }

    #[test]
    fn test_category_reload_overwrites_description() {
        let mut store = store();
        let mut loader = CatalogLoader::new(&mut store);

        loader
            .load_default(&[TechnologyCategory::new("Deep Learning", "first")])
            .unwrap();
        loader
            .load(&[TechnologyCategory::new("Deep Learning", "second")], LoadPolicy::ReplaceByKey)
            .unwrap();

        assert_eq!(store.count_rows("technology_categories").unwrap(), 1);
        let description: Option<String> = store
            .connection()
            .query_row(
                "SELECT description FROM technology_categories WHERE category_name = ?1",
                ["Deep Learning"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(description.as_deref(), Some("second"));
    }

    #[test]
    fn test_ignore_existing_keeps_first_row() {
        let mut store = store();
        let mut loader = CatalogLoader::new(&mut store);

        loader
            .load(&[Organization::new("Acme", "Tech", "USA", 2020, "first")], LoadPolicy::IgnoreExisting)
            .unwrap();
        let report = loader
            .load(&[Organization::new("Acme", "Tech", "USA", 2020, "second")], LoadPolicy::IgnoreExisting)
            .unwrap();

        assert_eq!(report.attempted, 1);
        assert_eq!(report.written, 0);
        assert_eq!(org_description(&store, "Acme").1.as_deref(), Some("first"));
    }

    #[test]
    fn test_append_only_duplicates() {
        let mut store = store();
        let mut loader = CatalogLoader::new(&mut store);
        let batch = vec![Sensor::new("BMI088", "IMU", "Bosch Sensortec")];

        loader.load_default(&batch).unwrap();
        loader.load_default(&batch).unwrap();

        assert_eq!(store.count_rows("sensors").unwrap(), 2);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut store = store();
        let mut loader = CatalogLoader::new(&mut store);
        let batch = vec![
            Organization::named("Acme"),
            Organization::named("Globex"),
            Organization::named("Acme"),
        ];

        let err = loader.load(&batch, LoadPolicy::AppendOnly).unwrap_err();

        match &err {
            Error::BatchRejected { table, index, source } => {
                assert_eq!(*table, "companies");
                assert_eq!(*index, 2);
                assert!(matches!(**source, Error::ConstraintViolation(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_constraint_violation());
        assert_eq!(store.count_rows("companies").unwrap(), 0);
    }

    #[test]
    fn test_load_without_schema_reports_missing_table() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut loader = CatalogLoader::new(&mut store);

        let err = loader
            .load_default(&[Technology::new("Acme", "Widget AI")])
            .unwrap_err();
        assert!(matches!(err, Error::SchemaMissing(t) if t == "ml_technologies"));
    }

    #[test]
    fn test_reference_check_warn_and_deny() {
        let mut store = store();
        let techs = vec![
            Technology::new("Acme", "Widget AI"),
            Technology::new("Ghost Corp", "Phantom"),
        ];

        {
            let mut loader = CatalogLoader::new(&mut store).with_reference_check(ReferenceCheck::Deny);
            loader.load_default(&[Organization::named("Acme")]).unwrap();
            let err = loader.load_default(&techs).unwrap_err();
            assert!(matches!(err, Error::DanglingReferences { ref names, .. } if names == &["Ghost Corp"]));
        }
        assert_eq!(store.count_rows("ml_technologies").unwrap(), 0);

        let mut loader = CatalogLoader::new(&mut store).with_reference_check(ReferenceCheck::Warn);
        let report = loader.load_default(&techs).unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.dangling, vec!["Ghost Corp".to_string()]);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("replace".parse::<LoadPolicy>().unwrap(), LoadPolicy::ReplaceByKey);
        assert_eq!("ignore-existing".parse::<LoadPolicy>().unwrap(), LoadPolicy::IgnoreExisting);
        assert!("upsert".parse::<LoadPolicy>().is_err());
        assert_eq!("warn".parse::<ReferenceCheck>().unwrap(), ReferenceCheck::Warn);
    }
}
