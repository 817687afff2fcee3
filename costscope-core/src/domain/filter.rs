//! Filter selection domain model

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::record::{CostRecord, Field};

/// Multi-valued filter selection, keyed by field
///
/// An empty (or missing) value set means "no restriction" for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    selected: BTreeMap<Field, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values to a field's selection, returning the updated selection
    pub fn with<I, S>(mut self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(field, values);
        self
    }

    /// Add values to a field's selection
    ///
    /// Blank values are ignored.
    pub fn select<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.selected.entry(field).or_default();
        for value in values {
            let value = value.into().trim().to_string();
            if !value.is_empty() {
                entry.insert(value);
            }
        }
    }

    /// Replace a field's selection
    pub fn set<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.remove(&field);
        self.select(field, values);
    }

    /// Clear a single field
    pub fn clear(&mut self, field: Field) {
        self.selected.remove(&field);
    }

    /// Clear every field
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    /// Selected values for a field, if any
    pub fn values(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.selected.get(&field).filter(|values| !values.is_empty())
    }

    /// True when no field restricts the result
    pub fn is_empty(&self) -> bool {
        self.selected.values().all(|values| values.is_empty())
    }

    /// Fields with a non-empty selection
    pub fn active(&self) -> impl Iterator<Item = (Field, &BTreeSet<String>)> {
        self.selected
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(field, values)| (*field, values))
    }

    /// AND across fields, OR within a field
    ///
    /// A record missing an optional field never matches a filter on it.
    pub fn matches(&self, record: &CostRecord) -> bool {
        self.active().all(|(field, values)| {
            field
                .value(record)
                .map_or(false, |value| values.contains(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_do_not_activate_filter() {
        let selection = FilterSelection::new().with(Field::Department, ["", "  "]);
        assert!(selection.is_empty());
        assert!(selection.values(Field::Department).is_none());
    }

    #[test]
    fn test_set_replaces_previous_values() {
        let mut selection = FilterSelection::new().with(Field::Service, ["EC2", "S3"]);
        selection.set(Field::Service, ["RDS"]);

        let values: Vec<_> = selection.values(Field::Service).unwrap().iter().collect();
        assert_eq!(values, vec!["RDS"]);
    }

    #[test]
    fn test_matches_requires_optional_field() {
        let record = CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 1.0);
        let selection = FilterSelection::new().with(Field::Owner, ["alice"]);
        assert!(!selection.matches(&record));

        let owned = record.with(Field::Owner, "alice");
        assert!(selection.matches(&owned));
    }
}
