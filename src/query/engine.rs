//! Query engine implementation
//!
//! Provides read-only reporting operations:
//! - Listings of organizations, categories, technologies and hardware
//! - Keyword search across technology name, description and application area
//! - Aggregate statistics (technologies per organization, type distribution)
//!
//! Organization links are resolved at query time by equality on
//! `company_name`; no foreign keys are involved.

use rusqlite::{Params, Row};
use serde::{Deserialize, Serialize};

use crate::model::{Equipment, FlightControlSystem, Organization, Sensor, Technology, TechnologyCategory};
use crate::storage::schema;
use crate::storage::CatalogStore;
use crate::{Error, Result};

const ORGANIZATION_COLUMNS: &str = "id, company_name, industry, country, founded_year, description";

const TECHNOLOGY_COLUMNS: &str = "id, company_name, technology_name, technology_type, application_area, \
     description, implementation_date, source, created_at";

const EQUIPMENT_COLUMNS: &str = "id, name, manufacturer, category, description, specifications, \
     supported_software, price_range, availability, created_at";

const FLIGHT_CONTROL_COLUMNS: &str = "id, name, type, description, features, supported_hardware, \
     open_source, community_support, documentation_url, created_at";

const SENSOR_COLUMNS: &str = "id, name, type, manufacturer, specifications, accuracy, \"range\", \
     power_consumption, interface, created_at";

/// Number of technologies attributed to one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationStats {
    pub company_name: String,
    pub industry: Option<String>,
    pub technology_count: usize,
}

/// Number of technologies carrying one technology type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub technology_type: String,
    pub count: usize,
}

/// Row counts for every catalog table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub organizations: usize,
    pub categories: usize,
    pub technologies: usize,
    pub equipment: usize,
    pub flight_control_systems: usize,
    pub sensors: usize,
}

impl std::fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Summary:")?;
        writeln!(f, "  Companies: {}", self.organizations)?;
        writeln!(f, "  Technology Categories: {}", self.categories)?;
        writeln!(f, "  ML Technologies: {}", self.technologies)?;
        writeln!(f, "  Equipment: {}", self.equipment)?;
        writeln!(f, "  Flight Control Systems: {}", self.flight_control_systems)?;
        write!(f, "  Sensors: {}", self.sensors)
    }
}

/// Read-only query engine over a populated catalog
pub struct QueryEngine<'a> {
    store: &'a CatalogStore,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// All organizations, ordered by name
    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        let sql = format!(
            "SELECT {} FROM companies ORDER BY company_name ASC",
            ORGANIZATION_COLUMNS
        );
        self.query_rows(&sql, [], row_to_organization)
    }

    /// Technologies, optionally scoped to one organization.
    ///
    /// Scoped results match `company_name` exactly (case-sensitive) and are
    /// ordered newest implementation first; the unscoped listing is ordered
    /// by organization then technology name.
    pub fn list_technologies(&self, company_name: Option<&str>) -> Result<Vec<Technology>> {
        match company_name {
            Some(company) => {
                let sql = format!(
                    "SELECT {} FROM ml_technologies WHERE company_name = ?1 \
                     ORDER BY implementation_date DESC, id ASC",
                    TECHNOLOGY_COLUMNS
                );
                self.query_rows(&sql, [company], row_to_technology)
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM ml_technologies \
                     ORDER BY company_name ASC, technology_name ASC, id ASC",
                    TECHNOLOGY_COLUMNS
                );
                self.query_rows(&sql, [], row_to_technology)
            }
        }
    }

    /// All technology categories, ordered by name
    pub fn list_categories(&self) -> Result<Vec<TechnologyCategory>> {
        self.query_rows(
            "SELECT id, category_name, description FROM technology_categories ORDER BY category_name ASC",
            [],
            |row| {
                Ok(TechnologyCategory {
                    id: row.get(0)?,
                    category_name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
    }

    /// Technologies whose name, description or application area contains `keyword`.
    ///
    /// Matching is a case-insensitive substring test on the keyword exactly as
    /// given, whitespace included; `%` and `_` match themselves. An empty
    /// keyword matches nothing but still requires the table to exist.
    pub fn search_technologies(&self, keyword: &str) -> Result<Vec<Technology>> {
        if keyword.is_empty() {
            if !self.store.table_exists(schema::ML_TECHNOLOGIES)? {
                return Err(Error::SchemaMissing(schema::ML_TECHNOLOGIES.to_string()));
            }
            return Ok(Vec::new());
        }

        let pattern = like_pattern(keyword);
        tracing::debug!("Searching technologies with pattern {:?}", pattern);
        let sql = format!(
            r"SELECT {} FROM ml_technologies
              WHERE technology_name LIKE ?1 ESCAPE '\'
                 OR description LIKE ?1 ESCAPE '\'
                 OR application_area LIKE ?1 ESCAPE '\'
              ORDER BY company_name ASC, technology_name ASC, id ASC",
            TECHNOLOGY_COLUMNS
        );
        self.query_rows(&sql, [pattern], row_to_technology)
    }

    /// Technology count per organization, including organizations with none.
    ///
    /// Ordered by count descending, ties broken by organization name.
    pub fn organization_statistics(&self) -> Result<Vec<OrganizationStats>> {
        self.query_rows(
            "SELECT c.company_name, c.industry, COUNT(t.id) AS technology_count
             FROM companies c
             LEFT JOIN ml_technologies t ON c.company_name = t.company_name
             GROUP BY c.id, c.company_name, c.industry
             ORDER BY technology_count DESC, c.company_name ASC",
            [],
            |row| {
                Ok(OrganizationStats {
                    company_name: row.get(0)?,
                    industry: row.get(1)?,
                    technology_count: row.get::<_, i64>(2)? as usize,
                })
            },
        )
    }

    /// Technology count per distinct non-null technology type, most common first
    pub fn technology_type_distribution(&self) -> Result<Vec<TypeCount>> {
        self.query_rows(
            "SELECT technology_type, COUNT(*) AS count
             FROM ml_technologies
             WHERE technology_type IS NOT NULL
             GROUP BY technology_type
             ORDER BY count DESC, technology_type ASC",
            [],
            |row| {
                Ok(TypeCount {
                    technology_type: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            },
        )
    }

    /// Technologies whose organization has no row in `companies`
    pub fn dangling_technologies(&self) -> Result<Vec<Technology>> {
        let sql = format!(
            "SELECT {} FROM ml_technologies t
             WHERE NOT EXISTS (SELECT 1 FROM companies c WHERE c.company_name = t.company_name)
             ORDER BY company_name ASC, technology_name ASC, id ASC",
            TECHNOLOGY_COLUMNS
        );
        self.query_rows(&sql, [], row_to_technology)
    }

    /// Equipment, optionally restricted to one category
    pub fn list_equipment(&self, category: Option<&str>) -> Result<Vec<Equipment>> {
        match category {
            Some(category) => {
                let sql = format!(
                    "SELECT {} FROM equipment WHERE category = ?1 ORDER BY name ASC, id ASC",
                    EQUIPMENT_COLUMNS
                );
                self.query_rows(&sql, [category], row_to_equipment)
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM equipment ORDER BY category ASC, name ASC, id ASC",
                    EQUIPMENT_COLUMNS
                );
                self.query_rows(&sql, [], row_to_equipment)
            }
        }
    }

    /// Flight control systems, optionally only the open-source ones
    pub fn list_flight_control_systems(&self, open_source_only: bool) -> Result<Vec<FlightControlSystem>> {
        let filter = if open_source_only { "WHERE open_source = 1" } else { "" };
        let sql = format!(
            "SELECT {} FROM flight_control_systems {} ORDER BY name ASC, id ASC",
            FLIGHT_CONTROL_COLUMNS, filter
        );
        self.query_rows(&sql, [], row_to_flight_control_system)
    }

    /// Sensors, optionally restricted to one sensor type
    pub fn list_sensors(&self, sensor_type: Option<&str>) -> Result<Vec<Sensor>> {
        match sensor_type {
            Some(sensor_type) => {
                let sql = format!(
                    "SELECT {} FROM sensors WHERE type = ?1 ORDER BY name ASC, id ASC",
                    SENSOR_COLUMNS
                );
                self.query_rows(&sql, [sensor_type], row_to_sensor)
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM sensors ORDER BY type ASC, name ASC, id ASC",
                    SENSOR_COLUMNS
                );
                self.query_rows(&sql, [], row_to_sensor)
            }
        }
    }

    /// Row counts for all six tables
    pub fn catalog_summary(&self) -> Result<CatalogSummary> {
        Ok(CatalogSummary {
            organizations: self.store.count_rows(schema::COMPANIES)?,
            categories: self.store.count_rows(schema::TECHNOLOGY_CATEGORIES)?,
            technologies: self.store.count_rows(schema::ML_TECHNOLOGIES)?,
            equipment: self.store.count_rows(schema::EQUIPMENT)?,
            flight_control_systems: self.store.count_rows(schema::FLIGHT_CONTROL_SYSTEMS)?,
            sensors: self.store.count_rows(schema::SENSORS)?,
        })
    }

    /// Run a query and collect every row, propagating the first row error
    fn query_rows<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.store.connection().prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

/// Wrap a keyword in `%...%`, escaping LIKE wildcards with `\`
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn row_to_organization(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        company_name: row.get(1)?,
        industry: row.get(2)?,
        country: row.get(3)?,
        founded_year: row.get(4)?,
        description: row.get(5)?,
    })
}

fn row_to_technology(row: &Row<'_>) -> rusqlite::Result<Technology> {
    Ok(Technology {
        id: row.get(0)?,
        company_name: row.get(1)?,
        technology_name: row.get(2)?,
        technology_type: row.get(3)?,
        application_area: row.get(4)?,
        description: row.get(5)?,
        implementation_date: row.get(6)?,
        source: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn row_to_equipment(row: &Row<'_>) -> rusqlite::Result<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        name: row.get(1)?,
        manufacturer: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        specifications: row.get(5)?,
        supported_software: row.get(6)?,
        price_range: row.get(7)?,
        availability: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn row_to_flight_control_system(row: &Row<'_>) -> rusqlite::Result<FlightControlSystem> {
    Ok(FlightControlSystem {
        id: row.get(0)?,
        name: row.get(1)?,
        system_type: row.get(2)?,
        description: row.get(3)?,
        features: row.get(4)?,
        supported_hardware: row.get(5)?,
        open_source: row.get(6)?,
        community_support: row.get(7)?,
        documentation_url: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn row_to_sensor(row: &Row<'_>) -> rusqlite::Result<Sensor> {
    Ok(Sensor {
        id: row.get(0)?,
        name: row.get(1)?,
        sensor_type: row.get(2)?,
        manufacturer: row.get(3)?,
        specifications: row.get(4)?,
        accuracy: row.get(5)?,
        range: row.get(6)?,
        power_consumption: row.get(7)?,
        interface: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{CatalogLoader, LoadPolicy};

    fn tech(company: &str, name: &str, kind: &str, date: &str) -> Technology {
        Technology::new(company, name)
            .with_type(kind)
            .with_application_area("Monitoring")
            .with_description(format!("{} by {}", name, company))
            .implemented_on(date)
    }

    fn seeded_store() -> CatalogStore {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let mut loader = CatalogLoader::new(&mut store);
        loader
            .load_default(&[
                Organization::new("Splunk", "Data Analytics", "USA", 2003, "Data platform"),
                Organization::new("Elastic", "Search", "USA", 2012, "Search engine"),
                Organization::new("Zeta", "Robotics", "USA", 2020, "No technologies yet"),
            ])
            .unwrap();
        loader
            .load_default(&[
                tech("Splunk", "MLTK", "Deep Learning", "2020-01-01"),
                tech("Splunk", "Anomaly Detection", "Anomaly Detection", "2021-06-01"),
                tech("Elastic", "Elasticsearch ML", "Deep Learning", "2019-01-01"),
                tech("Orphan Labs", "Ghost Model", "Computer Vision", "2018-01-01"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_list_organizations_sorted() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        let names: Vec<_> = engine
            .list_organizations()
            .unwrap()
            .into_iter()
            .map(|o| o.company_name)
            .collect();
        assert_eq!(names, vec!["Elastic", "Splunk", "Zeta"]);
    }

    #[test]
    fn test_scoped_technologies_newest_first() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        let techs = engine.list_technologies(Some("Splunk")).unwrap();
        assert_eq!(techs.len(), 2);
        assert_eq!(techs[0].technology_name, "Anomaly Detection");
        assert_eq!(techs[1].technology_name, "MLTK");
        assert!(techs[0].created_at.is_some());

        assert!(engine.list_technologies(Some("splunk")).unwrap().is_empty());
        assert!(engine.list_technologies(Some("Zeta")).unwrap().is_empty());
    }

    #[test]
    fn test_unscoped_technologies_sorted_by_company_then_name() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        let pairs: Vec<_> = engine
            .list_technologies(None)
            .unwrap()
            .into_iter()
            .map(|t| (t.company_name, t.technology_name))
            .collect();
        assert_eq!(pairs[0], ("Elastic".to_string(), "Elasticsearch ML".to_string()));
        assert_eq!(pairs[2], ("Splunk".to_string(), "Anomaly Detection".to_string()));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_search_matches_any_column_case_insensitively() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        assert_eq!(engine.search_technologies("anomaly").unwrap().len(), 1);
        assert_eq!(engine.search_technologies("ANOMALY").unwrap().len(), 1);
        // application area
        assert_eq!(engine.search_technologies("monitor").unwrap().len(), 4);
        // description ("... by Elastic")
        assert_eq!(engine.search_technologies("by elastic").unwrap().len(), 1);
        assert!(engine.search_technologies("zzz-no-match").unwrap().is_empty());
        assert!(engine.search_technologies("").unwrap().is_empty());
    }

    #[test]
    fn test_search_keeps_whitespace_in_keyword() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        // every seeded description reads "<name> by <company>"
        assert_eq!(engine.search_technologies(" ").unwrap().len(), 4);
        assert_eq!(engine.search_technologies(" by splunk").unwrap().len(), 2);
        // leading space is significant: "MLTK" never follows a space
        assert!(engine.search_technologies(" mltk").unwrap().is_empty());
    }

    #[test]
    fn test_empty_search_without_schema_is_schema_missing() {
        let store = CatalogStore::open_in_memory().unwrap();
        let engine = QueryEngine::new(&store);

        assert!(matches!(
            engine.search_technologies(""),
            Err(Error::SchemaMissing(table)) if table == "ml_technologies"
        ));
        assert!(matches!(engine.search_technologies(" "), Err(Error::SchemaMissing(_))));
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        assert!(engine.search_technologies("%").unwrap().is_empty());
        assert!(engine.search_technologies("M_TK").unwrap().is_empty());
        assert!(engine.search_technologies("' OR 1=1 --").unwrap().is_empty());
    }

    #[test]
    fn test_organization_statistics_includes_zero_counts() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        let stats = engine.organization_statistics().unwrap();
        let rows: Vec<_> = stats
            .iter()
            .map(|s| (s.company_name.as_str(), s.technology_count))
            .collect();
        assert_eq!(rows, vec![("Splunk", 2), ("Elastic", 1), ("Zeta", 0)]);
    }

    #[test]
    fn test_statistics_ties_sorted_by_name() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        CatalogLoader::new(&mut store)
            .load(
                &[Organization::named("Beta"), Organization::named("Alpha")],
                LoadPolicy::ReplaceByKey,
            )
            .unwrap();

        let engine = QueryEngine::new(&store);
        let names: Vec<_> = engine
            .organization_statistics()
            .unwrap()
            .into_iter()
            .map(|s| s.company_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_type_distribution_skips_null_types() {
        let mut store = seeded_store();
        CatalogLoader::new(&mut store)
            .load_default(&[Technology::new("Splunk", "Untyped")])
            .unwrap();

        let engine = QueryEngine::new(&store);
        let dist = engine.technology_type_distribution().unwrap();
        let rows: Vec<_> = dist.iter().map(|d| (d.technology_type.as_str(), d.count)).collect();
        assert_eq!(
            rows,
            vec![("Deep Learning", 2), ("Anomaly Detection", 1), ("Computer Vision", 1)]
        );
    }

    #[test]
    fn test_dangling_technologies() {
        let store = seeded_store();
        let engine = QueryEngine::new(&store);

        let dangling = engine.dangling_technologies().unwrap();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].company_name, "Orphan Labs");
    }

    #[test]
    fn test_hardware_listings() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        {
            let mut loader = CatalogLoader::new(&mut store);
            loader
                .load_default(&[
                    Equipment::new("Pixhawk 4", "Pixhawk", "Flight Controller"),
                    Equipment::new("CUAV Radio V2", "CUAV", "Telemetry Radio"),
                ])
                .unwrap();
            loader
                .load_default(&[
                    FlightControlSystem::new("PX4", "Autopilot Software", true),
                    FlightControlSystem::new("DJI Onboard", "SDK", false),
                ])
                .unwrap();
            let mut baro = Sensor::new("MS5611", "Barometer", "TE Connectivity");
            baro.range = Some("10-1200 mbar".to_string());
            loader
                .load_default(&[baro, Sensor::new("BMI088", "IMU", "Bosch Sensortec")])
                .unwrap();
        }

        let engine = QueryEngine::new(&store);
        let controllers = engine.list_equipment(Some("Flight Controller")).unwrap();
        assert_eq!(controllers.len(), 1);
        assert_eq!(controllers[0].name, "Pixhawk 4");
        assert_eq!(engine.list_equipment(None).unwrap().len(), 2);

        let open = engine.list_flight_control_systems(true).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].open_source, Some(true));
        assert_eq!(engine.list_flight_control_systems(false).unwrap().len(), 2);

        let baros = engine.list_sensors(Some("Barometer")).unwrap();
        assert_eq!(baros[0].range.as_deref(), Some("10-1200 mbar"));
        assert!(engine.list_sensors(Some("Lidar")).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_summary() {
        let store = seeded_store();
        let summary = QueryEngine::new(&store).catalog_summary().unwrap();
        assert_eq!(summary.organizations, 3);
        assert_eq!(summary.technologies, 4);
        assert_eq!(summary.sensors, 0);
    }

    #[test]
    fn test_queries_fail_without_schema() {
        let store = CatalogStore::open_in_memory().unwrap();
        let engine = QueryEngine::new(&store);

        assert!(matches!(engine.list_organizations(), Err(Error::SchemaMissing(_))));
        assert!(matches!(engine.organization_statistics(), Err(Error::SchemaMissing(_))));
        assert!(matches!(engine.search_technologies("ai"), Err(Error::SchemaMissing(_))));
    }

    #[test]
    fn test_like_pattern_escaping() {
        assert_eq!(like_pattern("ai"), "%ai%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
