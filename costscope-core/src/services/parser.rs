//! CSV parser - turns uploaded text into cost records
//!
//! Columns are matched by case-insensitive substring containment, so
//! `Monthly Cost (USD)` satisfies the cost role and `Dept / Department`
//! satisfies the department role.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{CostRecord, Field};

/// Which record fields a CSV must, and may, supply
///
/// Cost is always required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub required: Vec<Field>,
    pub optional: Vec<Field>,
}

impl ColumnSchema {
    /// Month, department, project, service and cost only
    pub fn basic() -> Self {
        Self {
            required: Field::REQUIRED.to_vec(),
            optional: Vec::new(),
        }
    }

    /// Basic columns plus every optional extension column
    pub fn extended() -> Self {
        Self {
            required: Field::REQUIRED.to_vec(),
            optional: Field::ALL
                .iter()
                .copied()
                .filter(Field::is_optional)
                .collect(),
        }
    }

    /// Column names listed in error messages
    fn required_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.required.iter().map(|f| f.to_string()).collect();
        names.push("cost".to_string());
        names
    }

    fn wants(&self, field: Field) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::extended()
    }
}

/// A header that satisfied a column role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub index: usize,
    pub header: String,
}

/// Result of column auto-detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectedColumns {
    pub fields: BTreeMap<Field, ColumnMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<ColumnMatch>,
}

impl DetectedColumns {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.fields.get(&field).map(|m| m.index)
    }

    /// Required columns that no header satisfied
    pub fn missing(&self, schema: &ColumnSchema) -> Vec<String> {
        let mut missing: Vec<String> = schema
            .required
            .iter()
            .filter(|f| !self.fields.contains_key(f))
            .map(|f| f.to_string())
            .collect();
        if self.cost.is_none() {
            missing.push("cost".to_string());
        }
        missing
    }
}

/// Output of a successful parse
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub records: Vec<CostRecord>,
    /// Rows dropped for being short or having an unparseable cost
    pub skipped: usize,
    pub columns: DetectedColumns,
}

/// Schema-driven CSV parser
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    schema: ColumnSchema,
}

impl CsvParser {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Read and parse a CSV file
    ///
    /// Rejects anything without a `.csv` extension before touching the file.
    pub fn load_file(&self, path: &Path) -> Result<ParseOutcome> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(Error::InvalidFileType(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path)?;
        self.parse(&text)
    }

    /// Parse CSV text into cost records
    pub fn parse(&self, text: &str) -> Result<ParseOutcome> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let columns = self.detect_columns(&headers);

        let missing = columns.missing(&self.schema);
        if !missing.is_empty() {
            return Err(Error::MissingColumns {
                missing,
                required: self.schema.required_names(),
            });
        }
        let cost_idx = columns.cost.as_ref().map(|m| m.index).ok_or(Error::NoValidData)?;

        let mut records = Vec::new();
        let mut skipped = 0;

        for result in reader.records() {
            let row = result?;
            if row.len() < headers.len() {
                skipped += 1;
                continue;
            }

            let cost = match row.get(cost_idx).and_then(parse_cost) {
                Some(cost) => cost,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let mut record = CostRecord::new("", "", "", "", cost);
            for (field, m) in &columns.fields {
                if let Some(value) = row.get(m.index) {
                    record.set(*field, value.to_string());
                }
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(Error::NoValidData);
        }

        Ok(ParseOutcome {
            records,
            skipped,
            columns,
        })
    }

    /// Auto-detect which header satisfies each column role
    ///
    /// Each header is claimed by at most one role. Roles are resolved most
    /// specific first, so `Project Name` goes to the project-name role before
    /// the plain project role is considered.
    pub fn detect_columns(&self, headers: &[String]) -> DetectedColumns {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = vec![false; headers.len()];
        let mut detected = DetectedColumns::default();

        // Cost: prefer an explicit cost column over a total column
        detected.cost = claim(headers, &lowered, &mut claimed, |h| h.contains("cost"))
            .or_else(|| claim(headers, &lowered, &mut claimed, |h| h.contains("total")));

        let roles: [(Field, fn(&str) -> bool); 9] = [
            (Field::Month, |h: &str| h.contains("month")),
            (Field::Department, |h: &str| h.contains("department")),
            (Field::ProjectName, |h: &str| h.contains("project") && h.contains("name")),
            (Field::Project, |h: &str| h.contains("project") && !h.contains("name")),
            (Field::Service, |h: &str| h.contains("service")),
            (Field::Owner, |h: &str| h.contains("owner")),
            (Field::AwsAccount, |h: &str| h.contains("account")),
            (Field::Category, |h: &str| h.contains("category")),
            (Field::Name, |h: &str| h.contains("name") && !h.contains("project")),
        ];

        for (field, pred) in roles {
            if !self.schema.wants(field) {
                continue;
            }
            if let Some(m) = claim(headers, &lowered, &mut claimed, pred) {
                detected.fields.insert(field, m);
            }
        }

        // A category column stands in for a missing service column
        if !detected.fields.contains_key(&Field::Service) {
            let fallback = match detected.fields.remove(&Field::Category) {
                Some(m) => Some(m),
                None => claim(headers, &lowered, &mut claimed, |h| h.contains("category")),
            };
            if let Some(m) = fallback {
                detected.fields.insert(Field::Service, m);
            }
        }

        detected
    }
}

/// Claim the first unclaimed header matching `pred`
fn claim(
    headers: &[String],
    lowered: &[String],
    claimed: &mut [bool],
    pred: impl Fn(&str) -> bool,
) -> Option<ColumnMatch> {
    let index = lowered
        .iter()
        .enumerate()
        .position(|(i, h)| !claimed[i] && pred(h))?;
    claimed[index] = true;
    Some(ColumnMatch {
        index,
        header: headers[index].clone(),
    })
}

/// Parse a CSV file with the default schema
pub fn load_file(path: &Path) -> Result<ParseOutcome> {
    CsvParser::default().load_file(path)
}

/// Parse CSV text with the default schema
pub fn parse(text: &str) -> Result<Vec<CostRecord>> {
    CsvParser::default().parse(text).map(|outcome| outcome.records)
}

/// Largest accepted line-item amount; anything bigger is unreadable
pub const MAX_COST: f64 = 1e15;

/// Parse a cost cell
///
/// Strips everything except digits, `.` and `-`, then reads the longest
/// leading number (`$1,234.56` -> 1234.56, `12.5.1` -> 12.5). Amounts beyond
/// `MAX_COST` are rejected so sums over a dataset stay finite.
pub fn parse_cost(raw: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)").unwrap());

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    number
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite() && v.abs() <= MAX_COST)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_cost_strips_currency_and_separators() {
        assert_eq!(parse_cost("$1,234.56"), Some(1234.56));
        assert_eq!(parse_cost("USD 99"), Some(99.0));
        assert_eq!(parse_cost("-12.50"), Some(-12.5));
        assert_eq!(parse_cost("12.5.1"), Some(12.5));
        assert_eq!(parse_cost(".75"), Some(0.75));
    }

    #[test]
    fn test_parse_cost_rejects_non_numeric() {
        assert_eq!(parse_cost("n/a"), None);
        assert_eq!(parse_cost(""), None);
        assert_eq!(parse_cost("-"), None);
        assert_eq!(parse_cost("."), None);
    }

    #[test]
    fn test_parse_cost_rejects_huge_amounts() {
        assert_eq!(parse_cost("1000000000000000"), Some(MAX_COST));
        assert_eq!(parse_cost("10000000000000000"), None);
        assert_eq!(parse_cost(&"9".repeat(308)), None);
        assert_eq!(parse_cost(&format!("-{}", "9".repeat(400))), None);
    }

    #[test]
    fn test_huge_rows_never_reach_sums() {
        let huge = "9".repeat(308);
        let text = format!(
            "month,department,project,service,cost\n\
             2024-01,Eng,Alpha,EC2,{huge}\n\
             2024-01,Eng,Alpha,EC2,{huge}\n\
             2024-01,Eng,Alpha,EC2,5\n"
        );
        let outcome = CsvParser::default().parse(&text).unwrap();

        assert_eq!(outcome.skipped, 2);
        let buckets = crate::services::aggregate::aggregate(&outcome.records, Field::Department);
        assert!(buckets.iter().all(|b| b.total.is_finite()));
        assert_eq!(buckets[0].total, 5.0);
    }

    #[test]
    fn test_detect_columns_substring_match() {
        let parser = CsvParser::default();
        let detected = parser.detect_columns(&headers(&[
            "Billing Month",
            "Department",
            "Project ID",
            "AWS Service",
            "Monthly Cost (USD)",
        ]));

        assert_eq!(detected.index(Field::Month), Some(0));
        assert_eq!(detected.index(Field::Department), Some(1));
        assert_eq!(detected.index(Field::Project), Some(2));
        assert_eq!(detected.index(Field::Service), Some(3));
        assert_eq!(detected.cost.as_ref().map(|m| m.index), Some(4));
    }

    #[test]
    fn test_detect_columns_project_name_disambiguation() {
        let parser = CsvParser::default();
        let detected = parser.detect_columns(&headers(&[
            "month",
            "department",
            "Project Name",
            "project",
            "service",
            "cost",
            "Name",
        ]));

        assert_eq!(detected.index(Field::ProjectName), Some(2));
        assert_eq!(detected.index(Field::Project), Some(3));
        assert_eq!(detected.index(Field::Name), Some(6));
    }

    #[test]
    fn test_detect_columns_category_and_total_fallbacks() {
        let parser = CsvParser::default();
        let detected = parser.detect_columns(&headers(&[
            "month",
            "department",
            "project",
            "Category",
            "Total",
        ]));

        assert_eq!(detected.index(Field::Service), Some(3));
        assert_eq!(detected.index(Field::Category), None);
        assert_eq!(detected.cost.as_ref().map(|m| m.index), Some(4));
        assert!(detected.missing(parser.schema()).is_empty());
    }

    #[test]
    fn test_basic_schema_ignores_optional_columns() {
        let parser = CsvParser::new(ColumnSchema::basic());
        let outcome = parser
            .parse("month,department,project,service,cost,owner\n2024-01,Eng,Alpha,EC2,10,alice")
            .unwrap();

        assert_eq!(outcome.records[0].owner, None);
        assert!(!outcome.columns.fields.contains_key(&Field::Owner));
    }

    #[test]
    fn test_parse_missing_columns_lists_them() {
        let err = parse("month,department,project\n2024-01,Eng,Alpha").unwrap_err();
        match err {
            Error::MissingColumns { missing, required } => {
                assert_eq!(missing, vec!["service".to_string(), "cost".to_string()]);
                assert_eq!(required.len(), 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_skips_short_and_invalid_rows() {
        let text = "month,department,project,service,cost\n\
                    2024-01,Eng,Alpha,EC2,100\n\
                    2024-01,Eng,Alpha\n\
                    2024-02,Eng,Alpha,EC2,unknown\n\
                    2024-02,Ops,Beta,S3,$20.50";
        let outcome = CsvParser::default().parse(text).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.records[1].cost, 20.5);
        assert_eq!(outcome.records[1].department, "Ops");
    }

    #[test]
    fn test_parse_trims_fields_and_attaches_optional_values() {
        let text = "Month , Department, Project, Service, Cost, Owner, Project Name\n\
                    2024-03 , Eng , Alpha , EC2 , 5 , , Alpha Platform";
        let records = parse(text).unwrap();

        assert_eq!(records[0].month, "2024-03");
        assert_eq!(records[0].project, "Alpha");
        assert_eq!(records[0].owner, None);
        assert_eq!(records[0].project_name.as_deref(), Some("Alpha Platform"));
    }

    #[test]
    fn test_parse_quoted_cost_with_thousands_separator() {
        let text = "month,department,project,service,cost\n2024-01,Eng,Alpha,EC2,\"$1,234.56\"";
        let records = parse(text).unwrap();
        assert_eq!(records[0].cost, 1234.56);
    }

    #[test]
    fn test_parse_no_valid_rows_is_error() {
        let err = parse("month,department,project,service,cost\n2024-01,Eng,Alpha,EC2,free").unwrap_err();
        assert!(matches!(err, Error::NoValidData));

        let err = parse("month,department,project,service,cost\n").unwrap_err();
        assert!(matches!(err, Error::NoValidData));
    }

    #[test]
    fn test_load_file_rejects_other_extensions() {
        let err = CsvParser::default()
            .load_file(Path::new("costs.xlsx"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFileType(_)));
    }
}
