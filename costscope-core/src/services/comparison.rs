//! Period comparator - splits the distinct months in half and diffs per project

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::bucket::round_cents;
use crate::domain::CostRecord;

/// Per-project change between the two periods
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChange {
    pub project: String,
    pub current: f64,
    pub previous: f64,
    /// 0 when the project had no spend in the previous period
    pub change_pct: f64,
    pub absolute_delta: f64,
    /// No spend in the previous period
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub previous_months: Vec<String>,
    pub current_months: Vec<String>,
    pub previous_total: f64,
    pub current_total: f64,
    pub overall_change_pct: f64,
    /// Largest absolute percentage change first
    pub changes: Vec<ProjectChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "camelCase")]
pub enum Comparison {
    Disabled,
    InsufficientData,
    Ready(ComparisonResult),
}

impl Comparison {
    pub fn result(&self) -> Option<&ComparisonResult> {
        match self {
            Comparison::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// Compare the earlier half of the months present against the later half
///
/// With an odd month count the midpoint month belongs to the current period.
pub fn compare(records: &[CostRecord], enabled: bool, top: usize) -> Comparison {
    if !enabled {
        return Comparison::Disabled;
    }

    let months: Vec<&str> = records
        .iter()
        .map(|r| r.month.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if months.len() < 2 {
        return Comparison::InsufficientData;
    }

    let (previous_months, current_months) = months.split_at(months.len() / 2);
    let previous_set: BTreeSet<&str> = previous_months.iter().copied().collect();

    // project -> (current, previous), in first-seen order with current-period projects first
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut current_total = 0.0;
    let mut previous_total = 0.0;

    for in_previous in [false, true] {
        for record in records {
            if previous_set.contains(record.month.as_str()) != in_previous {
                continue;
            }
            let entry = totals.entry(record.project.as_str()).or_insert_with(|| {
                order.push(record.project.as_str());
                (0.0, 0.0)
            });
            if in_previous {
                entry.1 += record.cost;
                previous_total += record.cost;
            } else {
                entry.0 += record.cost;
                current_total += record.cost;
            }
        }
    }

    let mut changes: Vec<ProjectChange> = order
        .into_iter()
        .map(|project| {
            let (current, previous) = totals[project];
            ProjectChange {
                project: project.to_string(),
                current: round_cents(current),
                previous: round_cents(previous),
                change_pct: percent_change(current, previous),
                absolute_delta: round_cents(current - previous),
                is_new: previous <= 0.0,
            }
        })
        .collect();
    changes.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));
    changes.truncate(top);

    Comparison::Ready(ComparisonResult {
        previous_months: previous_months.iter().map(|m| m.to_string()).collect(),
        current_months: current_months.iter().map(|m| m.to_string()).collect(),
        previous_total: round_cents(previous_total),
        current_total: round_cents(current_total),
        overall_change_pct: percent_change(current_total, previous_total),
        changes,
    })
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}
