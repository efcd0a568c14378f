//! Report tables
//!
//! Long free-text columns are truncated to a fixed display width with a
//! `...` suffix; the full text is available through `--format json`.

use tabled::settings::object::Columns;
use tabled::settings::{Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::model::{Equipment, FlightControlSystem, Organization, Sensor, Technology, TechnologyCategory};
use crate::query::{OrganizationStats, TypeCount};

const DESCRIPTION_WIDTH: usize = 50;
const NAME_WIDTH: usize = 30;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column metric/value table
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render rows with the given columns truncated to `width`
fn render<T: Tabled>(rows: Vec<T>, truncate: &[(usize, usize)]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    for &(column, width) in truncate {
        table.with(Modify::new(Columns::single(column)).with(Width::truncate(width).suffix("...")));
    }
    table.to_string()
}

#[derive(Tabled)]
struct OrganizationRow {
    #[tabled(rename = "Company")]
    name: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Founded")]
    founded: String,
}

pub fn organizations_table(organizations: &[Organization]) -> String {
    let rows = organizations
        .iter()
        .map(|o| OrganizationRow {
            name: o.company_name.clone(),
            industry: text(&o.industry),
            country: text(&o.country),
            founded: o.founded_year.map(|y| y.to_string()).unwrap_or_default(),
        })
        .collect();
    render::<OrganizationRow>(rows, &[])
}

#[derive(Tabled)]
struct TechnologyRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Technology")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn technologies_table(technologies: &[Technology]) -> String {
    let rows = technologies
        .iter()
        .map(|t| TechnologyRow {
            company: t.company_name.clone(),
            name: t.technology_name.clone(),
            kind: text(&t.technology_type),
            date: text(&t.implementation_date),
            description: text(&t.description),
        })
        .collect();
    render::<TechnologyRow>(rows, &[(1, NAME_WIDTH), (4, DESCRIPTION_WIDTH)])
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn categories_table(categories: &[TechnologyCategory]) -> String {
    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            name: c.category_name.clone(),
            description: text(&c.description),
        })
        .collect();
    render::<CategoryRow>(rows, &[(1, DESCRIPTION_WIDTH)])
}

#[derive(Tabled)]
struct OrganizationStatsRow {
    #[tabled(rename = "Company")]
    name: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Technologies")]
    count: usize,
}

pub fn organization_stats_table(stats: &[OrganizationStats]) -> String {
    let rows = stats
        .iter()
        .map(|s| OrganizationStatsRow {
            name: s.company_name.clone(),
            industry: text(&s.industry),
            count: s.technology_count,
        })
        .collect();
    render::<OrganizationStatsRow>(rows, &[])
}

#[derive(Tabled)]
struct TypeCountRow {
    #[tabled(rename = "Technology Type")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
}

pub fn type_distribution_table(distribution: &[TypeCount]) -> String {
    let rows = distribution
        .iter()
        .map(|d| TypeCountRow {
            kind: d.technology_type.clone(),
            count: d.count,
        })
        .collect();
    render::<TypeCountRow>(rows, &[])
}

#[derive(Tabled)]
struct EquipmentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn equipment_table(equipment: &[Equipment]) -> String {
    let rows = equipment
        .iter()
        .map(|e| EquipmentRow {
            name: e.name.clone(),
            manufacturer: text(&e.manufacturer),
            category: text(&e.category),
            price: text(&e.price_range),
            description: text(&e.description),
        })
        .collect();
    render::<EquipmentRow>(rows, &[(4, DESCRIPTION_WIDTH)])
}

#[derive(Tabled)]
struct FlightControlRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Open Source")]
    open_source: String,
    #[tabled(rename = "Community")]
    community: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn flight_control_table(systems: &[FlightControlSystem]) -> String {
    let rows = systems
        .iter()
        .map(|s| FlightControlRow {
            name: s.name.clone(),
            kind: text(&s.system_type),
            open_source: match s.open_source {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => String::new(),
            },
            community: text(&s.community_support),
            description: text(&s.description),
        })
        .collect();
    render::<FlightControlRow>(rows, &[(4, DESCRIPTION_WIDTH)])
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "Interface")]
    interface: String,
}

pub fn sensors_table(sensors: &[Sensor]) -> String {
    let rows = sensors
        .iter()
        .map(|s| SensorRow {
            name: s.name.clone(),
            kind: text(&s.sensor_type),
            manufacturer: text(&s.manufacturer),
            accuracy: text(&s.accuracy),
            interface: text(&s.interface),
        })
        .collect();
    render::<SensorRow>(rows, &[(3, NAME_WIDTH)])
}
