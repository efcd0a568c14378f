//! Catalog entities
//!
//! Each struct maps onto one table. `id` and `created_at` are assigned by
//! the storage engine on insert; records built in code or deserialized from
//! seed files leave them at their defaults.
//!
//! Relationships between entities are plain text: a `Technology` names its
//! owning organization through `company_name`, and equipment names its
//! manufacturer the same way. Nothing here requires the referenced row to exist.

use serde::{Deserialize, Serialize};

/// An organization (the `companies` table). Unique on `company_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: i64,
    pub company_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Organization {
    pub fn new(
        company_name: impl Into<String>,
        industry: impl Into<String>,
        country: impl Into<String>,
        founded_year: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0, // Set by DB
            company_name: company_name.into(),
            industry: Some(industry.into()),
            country: Some(country.into()),
            founded_year: Some(founded_year),
            description: Some(description.into()),
        }
    }

    /// An organization with only its name set
    pub fn named(company_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            company_name: company_name.into(),
            industry: None,
            country: None,
            founded_year: None,
            description: None,
        }
    }
}

/// Static reference vocabulary for technology types. Unique on `category_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyCategory {
    #[serde(default)]
    pub id: i64,
    pub category_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TechnologyCategory {
    pub fn new(category_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            category_name: category_name.into(),
            description: Some(description.into()),
        }
    }
}

/// A technology shipped by an organization (the `ml_technologies` table).
///
/// `technology_type` loosely follows [`TechnologyCategory`] names but is not
/// constrained to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    #[serde(default)]
    pub id: i64,
    pub company_name: String,
    pub technology_name: String,
    #[serde(default)]
    pub technology_type: Option<String>,
    #[serde(default)]
    pub application_area: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO date (`YYYY-MM-DD`) stored as text
    #[serde(default)]
    pub implementation_date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Technology {
    /// Create a new technology with minimal required fields
    pub fn new(company_name: impl Into<String>, technology_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            company_name: company_name.into(),
            technology_name: technology_name.into(),
            technology_type: None,
            application_area: None,
            description: None,
            implementation_date: None,
            source: None,
            created_at: None,
        }
    }

    pub fn with_type(mut self, technology_type: impl Into<String>) -> Self {
        self.technology_type = Some(technology_type.into());
        self
    }

    pub fn with_application_area(mut self, area: impl Into<String>) -> Self {
        self.application_area = Some(area.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn implemented_on(mut self, date: impl Into<String>) -> Self {
        self.implementation_date = Some(date.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Physical or software artifact (flight controllers, GPS modules, radios...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specifications: Option<String>,
    #[serde(default)]
    pub supported_software: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Equipment {
    pub fn new(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            manufacturer: Some(manufacturer.into()),
            category: Some(category.into()),
            description: None,
            specifications: None,
            supported_software: None,
            price_range: None,
            availability: None,
            created_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Autopilot stacks, ground stations, protocols and SDKs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightControlSystem {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub system_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub supported_hardware: Option<String>,
    #[serde(default)]
    pub open_source: Option<bool>,
    #[serde(default)]
    pub community_support: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FlightControlSystem {
    pub fn new(name: impl Into<String>, system_type: impl Into<String>, open_source: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            system_type: Some(system_type.into()),
            description: None,
            features: None,
            supported_hardware: None,
            open_source: Some(open_source),
            community_support: None,
            documentation_url: None,
            created_at: None,
        }
    }
}

/// Sensor hardware (IMUs, barometers, magnetometers, GNSS, optical flow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub specifications: Option<String>,
    #[serde(default)]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub power_consumption: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Sensor {
    pub fn new(
        name: impl Into<String>,
        sensor_type: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            sensor_type: Some(sensor_type.into()),
            manufacturer: Some(manufacturer.into()),
            specifications: None,
            accuracy: None,
            range: None,
            power_consumption: None,
            interface: None,
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technology_builder() {
        let tech = Technology::new("Acme", "Widget AI")
            .with_type("Deep Learning")
            .with_description("AI-powered anomaly detection")
            .implemented_on("2024-01-01");

        assert_eq!(tech.company_name, "Acme");
        assert_eq!(tech.technology_type.as_deref(), Some("Deep Learning"));
        assert_eq!(tech.implementation_date.as_deref(), Some("2024-01-01"));
        assert_eq!(tech.id, 0);
        assert!(tech.created_at.is_none());
    }

    #[test]
    fn test_type_column_renamed_in_serde() {
        let fcs: FlightControlSystem = toml::from_str(
            r#"
            name = "PX4"
            type = "Autopilot Software"
            open_source = true
            "#,
        )
        .unwrap();

        assert_eq!(fcs.system_type.as_deref(), Some("Autopilot Software"));
        assert_eq!(fcs.open_source, Some(true));
        assert!(fcs.features.is_none());
    }
}
