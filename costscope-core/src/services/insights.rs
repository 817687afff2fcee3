//! Insight generator - heuristic observations over the filtered records

use std::collections::{BTreeMap, HashMap};

use crate::config::InsightThresholds;
use crate::domain::bucket::share_pct;
use crate::domain::{CostRecord, Field, Insight, InsightKind, Severity};
use crate::services::aggregate::{aggregate, sort_desc};

pub struct InsightGenerator {
    thresholds: InsightThresholds,
}

impl InsightGenerator {
    pub fn new(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    /// Generate insights in order: month-over-month changes, department
    /// concentration, service usage. Truncated to `max_insights`.
    pub fn generate(&self, records: &[CostRecord]) -> Vec<Insight> {
        let mut insights = self.project_changes(records);
        insights.extend(self.concentration(records));
        insights.extend(most_used_service(records));
        insights.truncate(self.thresholds.max_insights);
        insights
    }

    fn project_changes(&self, records: &[CostRecord]) -> Vec<Insight> {
        let mut order: Vec<&str> = Vec::new();
        let mut monthly: HashMap<&str, BTreeMap<&str, f64>> = HashMap::new();
        for record in records {
            let months = monthly.entry(record.project.as_str()).or_insert_with(|| {
                order.push(record.project.as_str());
                BTreeMap::new()
            });
            *months.entry(record.month.as_str()).or_insert(0.0) += record.cost;
        }

        let mut insights = Vec::new();
        for project in order {
            let costs: Vec<f64> = monthly[project].values().copied().collect();
            for pair in costs.windows(2) {
                let (previous, current) = (pair[0], pair[1]);
                // no meaningful change from a zero or credit month
                if previous <= 0.0 {
                    continue;
                }
                let change = (current - previous) / previous * 100.0;

                if change > self.thresholds.spike_pct {
                    insights.push(Insight {
                        kind: InsightKind::Spike,
                        title: "Unusual Cost Spike Detected".to_string(),
                        description: format!(
                            "Project {} cost increased by {:.1}% compared to previous month",
                            project, change
                        ),
                        severity: Severity::High,
                        value: Some(format!("+{:.1}%", change)),
                    });
                } else if change < self.thresholds.drop_pct {
                    insights.push(Insight {
                        kind: InsightKind::Drop,
                        title: "Significant Cost Reduction".to_string(),
                        description: format!(
                            "Project {} cost decreased by {:.1}% compared to previous month",
                            project,
                            change.abs()
                        ),
                        severity: Severity::Medium,
                        value: Some(format!("{:.1}%", change)),
                    });
                }
            }
        }
        insights
    }

    fn concentration(&self, records: &[CostRecord]) -> Option<Insight> {
        let mut departments = aggregate(records, Field::Department);
        let total: f64 = departments.iter().map(|b| b.total).sum();
        sort_desc(&mut departments);

        let top = departments.first()?;
        let share = share_pct(top.total, total);
        if share <= self.thresholds.concentration_pct {
            return None;
        }

        Some(Insight {
            kind: InsightKind::Concentration,
            title: "Department Cost Concentration".to_string(),
            description: format!("{} accounts for {:.1}% of total costs", top.key, share),
            severity: Severity::Medium,
            value: Some(format!("{:.1}%", share)),
        })
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(InsightThresholds::default())
    }
}

fn most_used_service(records: &[CostRecord]) -> Option<Insight> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|entry| entry.0 == record.service) {
            Some(entry) => entry.1 += 1,
            None => counts.push((record.service.as_str(), 1)),
        }
    }

    // first encountered wins a tie
    let (service, count) = counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (s, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((s, n)),
        })?;

    Some(Insight {
        kind: InsightKind::Usage,
        title: "Most Utilized Service".to_string(),
        description: format!(
            "{} is the most frequently used service with {} instances",
            service, count
        ),
        severity: Severity::Low,
        value: Some(format!("{} uses", count)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_detected() {
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 100.0),
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 150.0),
        ];
        let insights = InsightGenerator::default().generate(&data);

        let spike = &insights[0];
        assert_eq!(spike.kind, InsightKind::Spike);
        assert_eq!(spike.severity, Severity::High);
        assert_eq!(spike.value.as_deref(), Some("+50.0%"));
        assert_eq!(
            spike.description,
            "Project Alpha cost increased by 50.0% compared to previous month"
        );
    }

    #[test]
    fn test_drop_detected_out_of_order_months() {
        let data = vec![
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 60.0),
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 100.0),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert_eq!(insights[0].kind, InsightKind::Drop);
        assert_eq!(insights[0].value.as_deref(), Some("-40.0%"));
        assert!(insights[0].description.contains("decreased by 40.0%"));
    }

    #[test]
    fn test_zero_previous_month_skipped() {
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 0.0),
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 10.0),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert!(insights.iter().all(|i| i.kind != InsightKind::Spike));
        assert!(insights
            .iter()
            .all(|i| i.value.as_deref().map_or(true, |v| !v.contains("inf"))));
    }

    #[test]
    fn test_credit_previous_month_skipped() {
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", -10.0),
            CostRecord::new("2024-02", "Eng", "Alpha", "EC2", 10.0),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert!(insights
            .iter()
            .all(|i| i.kind != InsightKind::Drop && i.kind != InsightKind::Spike));
    }

    #[test]
    fn test_concentration_and_usage() {
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 50.0),
            CostRecord::new("2024-01", "Eng", "Beta", "S3", 12.5),
            CostRecord::new("2024-01", "Ops", "Gamma", "S3", 37.5),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].kind, InsightKind::Concentration);
        assert_eq!(insights[0].value.as_deref(), Some("62.5%"));
        assert_eq!(insights[0].description, "Eng accounts for 62.5% of total costs");
        assert_eq!(insights[1].kind, InsightKind::Usage);
        assert_eq!(insights[1].value.as_deref(), Some("2 uses"));
    }

    #[test]
    fn test_no_concentration_below_threshold() {
        let data = vec![
            CostRecord::new("2024-01", "A", "P1", "EC2", 30.0),
            CostRecord::new("2024-01", "B", "P2", "S3", 35.0),
            CostRecord::new("2024-01", "C", "P3", "RDS", 35.0),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Usage);
        assert!(insights[0].description.starts_with("EC2 "));
    }

    #[test]
    fn test_concentration_uses_rounded_department_totals() {
        // 40.004% raw, exactly 40.00% once totals are rounded to cents
        let data = vec![
            CostRecord::new("2024-01", "Eng", "Alpha", "EC2", 40.004),
            CostRecord::new("2024-01", "Ops", "Beta", "S3", 59.996),
        ];
        let insights = InsightGenerator::default().generate(&data);

        assert!(insights.iter().all(|i| i.kind != InsightKind::Concentration));
    }

    #[test]
    fn test_truncated_to_max_insights() {
        let mut data = Vec::new();
        for project in ["A", "B", "C", "D", "E", "F"] {
            data.push(CostRecord::new("2024-01", "Eng", project, "EC2", 10.0));
            data.push(CostRecord::new("2024-02", "Eng", project, "EC2", 30.0));
        }
        let insights = InsightGenerator::default().generate(&data);
        assert_eq!(insights.len(), 5);
        assert!(insights.iter().all(|i| i.kind == InsightKind::Spike));

        let thresholds = InsightThresholds {
            max_insights: 2,
            ..InsightThresholds::default()
        };
        assert_eq!(InsightGenerator::new(thresholds).generate(&data).len(), 2);
    }

    #[test]
    fn test_empty_records() {
        assert!(InsightGenerator::default().generate(&[]).is_empty());
    }
}
