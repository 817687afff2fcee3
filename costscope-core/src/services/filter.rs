//! Filter engine - applies a multi-valued filter selection

use std::borrow::Cow;

use crate::domain::{CostRecord, FilterSelection};

/// Apply a filter selection to a record collection
///
/// When nothing is selected the input slice is returned as-is, without
/// copying. Otherwise the matching records are cloned in input order.
pub fn apply<'a>(records: &'a [CostRecord], selection: &FilterSelection) -> Cow<'a, [CostRecord]> {
    if selection.is_empty() {
        return Cow::Borrowed(records);
    }

    Cow::Owned(
        records
            .iter()
            .filter(|record| selection.matches(record))
            .cloned()
            .collect(),
    )
}

/// Count the records that would survive a filter selection
pub fn count_matching(records: &[CostRecord], selection: &FilterSelection) -> usize {
    if selection.is_empty() {
        return records.len();
    }
    records.iter().filter(|r| selection.matches(r)).count()
}
