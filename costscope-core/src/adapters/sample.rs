//! Bundled sample data
//!
//! Deterministic six-month dataset used when no CSV is supplied, plus the
//! template CSV users can fill in with their own data:
//! - 5 departments, 8 projects, 12 line items per month
//! - steady month-over-month growth
//! - a spike on Cortex in April and a drop on Echo in May

use crate::domain::bucket::round_cents;
use crate::domain::{CostRecord, Field};

/// Default name for the downloadable template
pub const TEMPLATE_FILENAME: &str = "sample-aws-cost-data.csv";

/// Default filename for the full bundled dataset
pub const DATASET_FILENAME: &str = "sample-aws-cost-dataset.csv";

/// Template CSV with every supported column
pub const TEMPLATE_CSV: &str = "\
month,department,project,service,cost,owner,category,awsAccount
2024-01,Engineering,Atlas,EC2,4200.00,platform-team,Compute,111122223333
2024-01,Engineering,Atlas,RDS,1800.00,platform-team,Database,111122223333
2024-01,Data Science,Cortex,SageMaker,3100.00,ml-team,Machine Learning,444455556666
2024-01,Marketing,Echo,CloudFront,540.00,growth-team,Networking,777788889999
2024-02,Engineering,Atlas,EC2,4368.00,platform-team,Compute,111122223333
2024-02,Data Science,Cortex,SageMaker,3224.00,ml-team,Machine Learning,444455556666
";

const MONTHS: [&str; 6] = ["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"];

// (department, project, service, base monthly cost)
const LINE_ITEMS: [(&str, &str, &str, f64); 12] = [
    ("Engineering", "Atlas", "EC2", 4200.0),
    ("Engineering", "Atlas", "RDS", 1800.0),
    ("Engineering", "Beacon", "Lambda", 650.0),
    ("Engineering", "Beacon", "S3", 420.0),
    ("Data Science", "Cortex", "SageMaker", 3100.0),
    ("Data Science", "Cortex", "S3", 880.0),
    ("Data Science", "Delta Lake", "EMR", 2400.0),
    ("Marketing", "Echo", "CloudFront", 540.0),
    ("Marketing", "Echo", "S3", 210.0),
    ("Finance", "Ledger", "RDS", 960.0),
    ("Operations", "Sentinel", "CloudWatch", 380.0),
    ("Operations", "Sentinel", "EC2", 720.0),
];

fn owner_of(department: &str) -> &'static str {
    match department {
        "Engineering" => "platform-team",
        "Data Science" => "ml-team",
        "Marketing" => "growth-team",
        "Finance" => "finance-ops",
        _ => "sre-team",
    }
}

fn category_of(service: &str) -> &'static str {
    match service {
        "EC2" | "Lambda" => "Compute",
        "RDS" => "Database",
        "S3" => "Storage",
        "SageMaker" | "EMR" => "Analytics",
        "CloudFront" => "Networking",
        _ => "Management",
    }
}

/// Scripted deviations from the growth trend
fn adjustment(project: &str, month: &str) -> f64 {
    match (project, month) {
        ("Cortex", "2024-04") => 1.8,
        ("Echo", "2024-05") => 0.5,
        _ => 1.0,
    }
}

/// Generate the bundled sample dataset
pub fn sample_records() -> Vec<CostRecord> {
    let mut records = Vec::with_capacity(MONTHS.len() * LINE_ITEMS.len());

    for (i, month) in MONTHS.iter().enumerate() {
        let growth = 1.0 + 0.04 * i as f64;
        for (department, project, service, base) in LINE_ITEMS {
            let cost = round_cents(base * growth * adjustment(project, month));
            records.push(
                CostRecord::new(*month, department, project, service, cost)
                    .with(Field::Owner, owner_of(department))
                    .with(Field::Category, category_of(service)),
            );
        }
    }

    records
}
