//! Cost record domain model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

/// One line-item of spend
///
/// `month` is expected in `YYYY-MM` form. It is used both as a grouping key
/// and as a sortable string, so other formats still load but sort oddly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRecord {
    pub month: String,
    pub department: String,
    pub project: String,
    pub service: String,
    /// Amount in USD, always finite
    pub cost: f64,

    // =========================================================================
    // Optional extension columns (only set when the CSV supplies them)
    // =========================================================================
    /// Resource name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account: Option<String>,
}

impl CostRecord {
    /// Create a record with the required fields
    pub fn new(
        month: impl Into<String>,
        department: impl Into<String>,
        project: impl Into<String>,
        service: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            month: month.into(),
            department: department.into(),
            project: project.into(),
            service: service.into(),
            cost,
            name: None,
            category: None,
            project_name: None,
            owner: None,
            aws_account: None,
        }
    }

    /// Set a categorical field, returning the updated record
    ///
    /// Empty values leave optional fields unset.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value.into());
        self
    }

    /// Set a categorical field in place
    pub fn set(&mut self, field: Field, value: String) {
        let optional = if value.is_empty() { None } else { Some(value.clone()) };
        match field {
            Field::Month => self.month = value,
            Field::Department => self.department = value,
            Field::Project => self.project = value,
            Field::Service => self.service = value,
            Field::Name => self.name = optional,
            Field::Category => self.category = optional,
            Field::ProjectName => self.project_name = optional,
            Field::Owner => self.owner = optional,
            Field::AwsAccount => self.aws_account = optional,
        }
    }

    /// Get the value of a categorical field
    pub fn get(&self, field: Field) -> Option<&str> {
        field.value(self)
    }
}

/// A categorical attribute of a cost record
///
/// Used as a group-by key, a filter facet, and a CSV column role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Month,
    Department,
    Project,
    Service,
    Name,
    Category,
    ProjectName,
    Owner,
    AwsAccount,
}

impl Field {
    /// Every field, in display order
    pub const ALL: [Field; 9] = [
        Field::Month,
        Field::Department,
        Field::Project,
        Field::Service,
        Field::Name,
        Field::Category,
        Field::ProjectName,
        Field::Owner,
        Field::AwsAccount,
    ];

    /// Fields every CSV must supply (cost is handled separately)
    pub const REQUIRED: [Field; 4] = [
        Field::Month,
        Field::Department,
        Field::Project,
        Field::Service,
    ];

    pub fn value<'a>(&self, record: &'a CostRecord) -> Option<&'a str> {
        match self {
            Field::Month => Some(record.month.as_str()),
            Field::Department => Some(record.department.as_str()),
            Field::Project => Some(record.project.as_str()),
            Field::Service => Some(record.service.as_str()),
            Field::Name => record.name.as_deref(),
            Field::Category => record.category.as_deref(),
            Field::ProjectName => record.project_name.as_deref(),
            Field::Owner => record.owner.as_deref(),
            Field::AwsAccount => record.aws_account.as_deref(),
        }
    }

    pub fn is_optional(&self) -> bool {
        !Self::REQUIRED.contains(self)
    }

    /// Stable machine key (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Month => "month",
            Field::Department => "department",
            Field::Project => "project",
            Field::Service => "service",
            Field::Name => "name",
            Field::Category => "category",
            Field::ProjectName => "projectName",
            Field::Owner => "owner",
            Field::AwsAccount => "awsAccount",
        }
    }

    /// Human readable column label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Month => "Month",
            Field::Department => "Department",
            Field::Project => "Project",
            Field::Service => "Service",
            Field::Name => "Name",
            Field::Category => "Category",
            Field::ProjectName => "Project Name",
            Field::Owner => "Owner",
            Field::AwsAccount => "AWS Account",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    /// Accepts `projectName`, `project-name`, `project_name`, `Project Name`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "month" | "months" | "timerange" => Ok(Field::Month),
            "department" | "dept" => Ok(Field::Department),
            "project" => Ok(Field::Project),
            "service" => Ok(Field::Service),
            "name" | "tag" => Ok(Field::Name),
            "category" => Ok(Field::Category),
            "projectname" => Ok(Field::ProjectName),
            "owner" => Ok(Field::Owner),
            "awsaccount" | "account" => Ok(Field::AwsAccount),
            _ => Err(Error::validation(format!("Unknown field: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_str_variants() {
        assert_eq!("department".parse::<Field>().unwrap(), Field::Department);
        assert_eq!("projectName".parse::<Field>().unwrap(), Field::ProjectName);
        assert_eq!("project-name".parse::<Field>().unwrap(), Field::ProjectName);
        assert_eq!("AWS Account".parse::<Field>().unwrap(), Field::AwsAccount);
        assert!("colour".parse::<Field>().is_err());
    }

    #[test]
    fn test_optional_fields_ignore_empty_values() {
        let record = CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 10.0)
            .with(Field::Owner, "")
            .with(Field::Category, "Compute");

        assert_eq!(record.owner, None);
        assert_eq!(record.get(Field::Category), Some("Compute"));
        assert_eq!(record.get(Field::Owner), None);
    }

    #[test]
    fn test_serialization_skips_missing_optional_fields() {
        let record = CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 10.0)
            .with(Field::ProjectName, "Alpha Platform");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["projectName"], "Alpha Platform");
        assert!(json.get("owner").is_none());
    }
}
