//! Unique-value extractor - filter option lists

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{CostRecord, Field};

/// Distinct non-empty values of a field, sorted ascending
pub fn unique_values(records: &[CostRecord], field: Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| field.value(record))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Option lists for every field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetValues {
    pub values: BTreeMap<Field, Vec<String>>,
}

impl FacetValues {
    pub fn get(&self, field: Field) -> &[String] {
        self.values.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Compute option lists for every field in one pass
///
/// Optional fields no record carries are left out.
pub fn facets(records: &[CostRecord]) -> FacetValues {
    let mut sets: BTreeMap<Field, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        for field in Field::ALL {
            if let Some(value) = field.value(record).filter(|v| !v.is_empty()) {
                sets.entry(field).or_default().insert(value);
            }
        }
    }

    FacetValues {
        values: sets
            .into_iter()
            .map(|(field, set)| (field, set.into_iter().map(str::to_string).collect()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CostRecord> {
        vec![
            CostRecord::new("2024-02", "Ops", "Beta", "S3", 1.0),
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 1.0).with(Field::Owner, "bob"),
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 1.0).with(Field::Owner, "alice"),
            CostRecord::new("2024-03", "", "Alpha", "EC2", 1.0),
        ]
    }

    #[test]
    fn test_unique_values_sorted_and_deduplicated() {
        let data = records();
        assert_eq!(unique_values(&data, Field::Month), vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(unique_values(&data, Field::Department), vec!["Eng", "Ops"]);
        assert_eq!(unique_values(&data, Field::Owner), vec!["alice", "bob"]);
        assert!(unique_values(&data, Field::Category).is_empty());
    }

    #[test]
    fn test_facets_match_unique_values() {
        let data = records();
        let all = facets(&data);

        for field in Field::ALL {
            assert_eq!(all.get(field), unique_values(&data, field).as_slice());
        }
        assert!(!all.values.contains_key(&Field::AwsAccount));
    }
}
