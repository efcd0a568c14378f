//! Database schema definitions
//!
//! Column names and types follow the existing `ml_technologies.db` layout so
//! files produced by earlier tooling open unchanged. No foreign keys are
//! declared: `ml_technologies.company_name` refers to `companies` by value only.

/// SQL to create the companies (organizations) table
pub const CREATE_COMPANIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name TEXT UNIQUE NOT NULL,
    industry TEXT,
    country TEXT,
    founded_year INTEGER,
    description TEXT
)
"#;

/// SQL to create the technology categories table
pub const CREATE_TECHNOLOGY_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS technology_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT UNIQUE NOT NULL,
    description TEXT
)
"#;

/// SQL to create the technologies table
pub const CREATE_ML_TECHNOLOGIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ml_technologies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name TEXT NOT NULL,
    technology_name TEXT NOT NULL,
    technology_type TEXT,
    application_area TEXT,
    description TEXT,
    implementation_date DATE,
    source TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the equipment table
pub const CREATE_EQUIPMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS equipment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    manufacturer TEXT,
    category TEXT,
    description TEXT,
    specifications TEXT,
    supported_software TEXT,
    price_range TEXT,
    availability TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the flight control systems table
pub const CREATE_FLIGHT_CONTROL_SYSTEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS flight_control_systems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT,
    description TEXT,
    features TEXT,
    supported_hardware TEXT,
    open_source BOOLEAN,
    community_support TEXT,
    documentation_url TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the sensors table
pub const CREATE_SENSORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sensors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT,
    manufacturer TEXT,
    specifications TEXT,
    accuracy TEXT,
    range TEXT,
    power_consumption TEXT,
    interface TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create indexes on the columns reports filter and join on
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_ml_technologies_company ON ml_technologies(company_name)",
    "CREATE INDEX IF NOT EXISTS idx_ml_technologies_type ON ml_technologies(technology_type)",
    "CREATE INDEX IF NOT EXISTS idx_equipment_category ON equipment(category)",
    "CREATE INDEX IF NOT EXISTS idx_sensors_type ON sensors(type)",
];

pub const COMPANIES: &str = "companies";
pub const TECHNOLOGY_CATEGORIES: &str = "technology_categories";
pub const ML_TECHNOLOGIES: &str = "ml_technologies";
pub const EQUIPMENT: &str = "equipment";
pub const FLIGHT_CONTROL_SYSTEMS: &str = "flight_control_systems";
pub const SENSORS: &str = "sensors";

/// Every catalog table, in creation order
pub const ALL_TABLES: &[&str] = &[
    COMPANIES,
    TECHNOLOGY_CATEGORIES,
    ML_TECHNOLOGIES,
    EQUIPMENT,
    FLIGHT_CONTROL_SYSTEMS,
    SENSORS,
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_COMPANIES_TABLE,
        CREATE_TECHNOLOGY_CATEGORIES_TABLE,
        CREATE_ML_TECHNOLOGIES_TABLE,
        CREATE_EQUIPMENT_TABLE,
        CREATE_FLIGHT_CONTROL_SYSTEMS_TABLE,
        CREATE_SENSORS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
