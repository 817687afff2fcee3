//! Aggregator - group-by sums and the chart/report views built on them

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::bucket::{round_cents, share_pct};
use crate::domain::result::Error;
use crate::domain::{AggregatedBucket, CostRecord, Field};

/// Sum cost per distinct value of `field`
///
/// Buckets come back in first-encountered order with totals rounded to
/// cents. Records without a value for an optional field are left out.
pub fn aggregate(records: &[CostRecord], field: Field) -> Vec<AggregatedBucket> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64)> = Vec::new();

    for record in records {
        let Some(key) = field.value(record) else {
            continue;
        };
        match index.get(key) {
            Some(&i) => sums[i].1 += record.cost,
            None => {
                index.insert(key, sums.len());
                sums.push((key, record.cost));
            }
        }
    }

    sums.into_iter()
        .map(|(key, total)| AggregatedBucket::new(key, round_cents(total)))
        .collect()
}

/// Stable sort, largest total first
pub fn sort_desc(buckets: &mut [AggregatedBucket]) {
    buckets.sort_by(|a, b| b.total.total_cmp(&a.total));
}

/// Chart presentation variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            "line" => Ok(ChartKind::Line),
            other => Err(Error::validation(format!("Unknown chart type: {}", other))),
        }
    }
}

/// Bar chart: largest `top` buckets, descending
pub fn bar_chart(records: &[CostRecord], field: Field, top: usize) -> Vec<AggregatedBucket> {
    let mut buckets = aggregate(records, field);
    sort_desc(&mut buckets);
    buckets.truncate(top);
    buckets
}

/// One pie slice with its share of the displayed total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub key: String,
    pub total: f64,
    pub share_pct: f64,
}

/// Pie chart: every bucket (or the largest `top`), descending
pub fn pie_chart(records: &[CostRecord], field: Field, top: Option<usize>) -> Vec<PieSlice> {
    let mut buckets = aggregate(records, field);
    sort_desc(&mut buckets);
    if let Some(top) = top {
        buckets.truncate(top);
    }

    let shown: f64 = buckets.iter().map(|b| b.total).sum();
    buckets
        .into_iter()
        .map(|b| PieSlice {
            share_pct: share_pct(b.total, shown),
            key: b.key,
            total: b.total,
        })
        .collect()
}

/// One row of any chart view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub key: String,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_pct: Option<f64>,
}

impl From<AggregatedBucket> for ChartRow {
    fn from(bucket: AggregatedBucket) -> Self {
        Self {
            key: bucket.key,
            total: bucket.total,
            share_pct: None,
        }
    }
}

impl From<PieSlice> for ChartRow {
    fn from(slice: PieSlice) -> Self {
        Self {
            key: slice.key,
            total: slice.total,
            share_pct: Some(slice.share_pct),
        }
    }
}

/// Line chart: monthly totals in ascending month order
///
/// Ordering is lexical, which is chronological for `YYYY-MM` months.
pub fn monthly_series(records: &[CostRecord]) -> Vec<AggregatedBucket> {
    let mut buckets = aggregate(records, Field::Month);
    buckets.sort_by(|a, b| a.key.cmp(&b.key));
    buckets
}

/// Headline numbers for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_cost: f64,
    pub record_count: usize,
    pub departments: usize,
    pub projects: usize,
    pub services: usize,
}

pub fn summary(records: &[CostRecord]) -> SummaryMetrics {
    let distinct = |field: Field| aggregate(records, field).len();

    SummaryMetrics {
        total_cost: round_cents(records.iter().map(|r| r.cost).sum()),
        record_count: records.len(),
        departments: distinct(Field::Department),
        projects: distinct(Field::Project),
        services: distinct(Field::Service),
    }
}

/// Ranked report presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopNKind {
    Projects,
    Services,
    Departments,
}

impl TopNKind {
    pub const ALL: [TopNKind; 3] = [TopNKind::Projects, TopNKind::Services, TopNKind::Departments];

    /// Report identifier, also used for the export filename
    pub fn id(&self) -> &'static str {
        match self {
            TopNKind::Projects => "top-5-projects",
            TopNKind::Services => "top-10-services",
            TopNKind::Departments => "top-departments",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TopNKind::Projects => "Top 5 Costliest Projects",
            TopNKind::Services => "Top 10 Services Used",
            TopNKind::Departments => "Top Departments by Cost",
        }
    }

    pub fn field(&self) -> Field {
        match self {
            TopNKind::Projects => Field::Project,
            TopNKind::Services => Field::Service,
            TopNKind::Departments => Field::Department,
        }
    }

    pub fn limit(&self) -> usize {
        match self {
            TopNKind::Services => 10,
            TopNKind::Projects | TopNKind::Departments => 5,
        }
    }
}

impl FromStr for TopNKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top-5-projects" | "projects" | "project" => Ok(TopNKind::Projects),
            "top-10-services" | "services" | "service" => Ok(TopNKind::Services),
            "top-departments" | "departments" | "department" => Ok(TopNKind::Departments),
            other => Err(Error::validation(format!("Unknown report: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopNEntry {
    pub rank: usize,
    pub name: String,
    pub cost: f64,
    /// Share of the total across the listed entries
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopNReport {
    pub kind: TopNKind,
    pub entries: Vec<TopNEntry>,
}

pub fn top_n(records: &[CostRecord], kind: TopNKind) -> TopNReport {
    let buckets = bar_chart(records, kind.field(), kind.limit());
    let shown: f64 = buckets.iter().map(|b| b.total).sum();

    TopNReport {
        kind,
        entries: buckets
            .into_iter()
            .enumerate()
            .map(|(i, b)| TopNEntry {
                rank: i + 1,
                share_pct: share_pct(b.total, shown),
                name: b.key,
                cost: b.total,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceBreakdown {
    pub service: String,
    pub cost: f64,
    pub count: usize,
}

/// Detail view for a single bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDown {
    pub field: Field,
    pub key: String,
    pub total: f64,
    pub record_count: usize,
    /// Per service, largest cost first
    pub services: Vec<ServiceBreakdown>,
    /// Per month, ascending
    pub months: Vec<AggregatedBucket>,
}

/// Break one bucket (`field == key`) down by service and by month
pub fn drill_down(records: &[CostRecord], field: Field, key: &str) -> DrillDown {
    let selected: Vec<CostRecord> = records
        .iter()
        .filter(|r| field.value(r) == Some(key))
        .cloned()
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in &selected {
        *counts.entry(record.service.as_str()).or_insert(0) += 1;
    }

    let mut by_service = aggregate(&selected, Field::Service);
    sort_desc(&mut by_service);
    let services = by_service
        .into_iter()
        .map(|b| ServiceBreakdown {
            count: counts.get(b.key.as_str()).copied().unwrap_or(0),
            service: b.key,
            cost: b.total,
        })
        .collect();

    DrillDown {
        field,
        key: key.to_string(),
        total: round_cents(selected.iter().map(|r| r.cost).sum()),
        record_count: selected.len(),
        services,
        months: monthly_series(&selected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CostRecord> {
        vec![
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 100.0),
            CostRecord::new("2024-01", "Ops", "Beta", "S3", 50.0),
            CostRecord::new("2024-01", "Eng", "Gamma", "S3", 75.25),
            CostRecord::new("2024-03", "Finance", "Delta", "RDS", 50.0),
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 0.004),
        ]
    }

    #[test]
    fn test_aggregate_first_encountered_order_and_rounding() {
        let buckets = aggregate(&records(), Field::Department);
        assert_eq!(
            buckets,
            vec![
                AggregatedBucket::new("Eng", 175.25),
                AggregatedBucket::new("Ops", 50.0),
                AggregatedBucket::new("Finance", 50.0),
            ]
        );
    }

    #[test]
    fn test_aggregate_total_matches_input_sum() {
        let data = records();
        let input: f64 = data.iter().map(|r| r.cost).sum();

        for field in [Field::Month, Field::Department, Field::Project, Field::Service] {
            let buckets = aggregate(&data, field);
            let total: f64 = buckets.iter().map(|b| b.total).sum();
            assert!((total - input).abs() <= 0.01 * buckets.len() as f64);
        }
    }

    #[test]
    fn test_aggregate_skips_missing_optional_values() {
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 10.0).with(Field::Owner, "alice"),
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 5.0),
        ];
        assert_eq!(aggregate(&data, Field::Owner), vec![AggregatedBucket::new("alice", 10.0)]);
    }

    #[test]
    fn test_bar_chart_sorts_desc_with_stable_ties() {
        let buckets = bar_chart(&records(), Field::Department, 10);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["Eng", "Ops", "Finance"]);

        assert_eq!(bar_chart(&records(), Field::Department, 1).len(), 1);
    }

    #[test]
    fn test_pie_chart_shares_sum_to_hundred() {
        let slices = pie_chart(&records(), Field::Service, None);
        let total_share: f64 = slices.iter().map(|s| s.share_pct).sum();
        assert!((total_share - 100.0).abs() < 1e-9);
        assert_eq!(slices[0].key, "S3");
    }

    #[test]
    fn test_monthly_series_ascending() {
        let series = monthly_series(&records());
        let months: Vec<&str> = series.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(series[0].total, 125.25);
    }

    #[test]
    fn test_summary_counts_distinct_values() {
        let metrics = summary(&records());
        assert_eq!(metrics.total_cost, 275.25);
        assert_eq!(metrics.record_count, 5);
        assert_eq!(metrics.departments, 3);
        assert_eq!(metrics.projects, 4);
        assert_eq!(metrics.services, 3);
    }

    #[test]
    fn test_top_n_ranks_and_limits() {
        let report = top_n(&records(), TopNKind::Projects);
        assert_eq!(report.entries.len(), 4);
        assert_eq!(report.entries[0].rank, 1);
        assert_eq!(report.entries[0].name, "Alpha");
        assert_eq!(report.entries[1].name, "Gamma");

        assert_eq!("top-10-services".parse::<TopNKind>().unwrap(), TopNKind::Services);
        assert!("top-3-owners".parse::<TopNKind>().is_err());
    }

    #[test]
    fn test_drill_down_breakdowns() {
        let detail = drill_down(&records(), Field::Department, "Eng");
        assert_eq!(detail.record_count, 3);
        assert_eq!(detail.total, 175.25);
        assert_eq!(detail.services[0].service, "EC2");
        assert_eq!(detail.services[0].count, 2);
        assert_eq!(detail.services[1].service, "S3");
        assert_eq!(detail.months[0].key, "2024-01");
        assert_eq!(detail.months[1].total, 100.0);
    }
}
