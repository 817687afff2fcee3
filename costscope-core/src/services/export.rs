//! Exporters - CSV, top-N report CSV and printable HTML report
//!
//! Files are written to a temporary file in the target directory and then
//! renamed into place, so a failed export never leaves a partial file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::{CostRecord, Field, FilterSelection};
use crate::services::aggregate::{summary, ChartKind, TopNReport};

pub const CSV_HEADER: [&str; 5] = ["Month", "Department", "Project", "Service", "Cost (USD)"];

/// Lowercase and replace whitespace runs with `-`
pub fn kebab_case(value: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    whitespace.replace_all(&value.to_lowercase(), "-").into_owned()
}

/// `aws-cost-<department>-<period>-<date>.csv`
///
/// A single selected department or month names the file; no selection maps
/// to `all-departments` / `all-periods`, several to `multiple-*`.
pub fn csv_filename(selection: &FilterSelection, today: NaiveDate) -> String {
    format!("{}.csv", export_stem(selection, today))
}

/// Same name as the CSV export, with an `.html` extension
pub fn html_filename(selection: &FilterSelection, today: NaiveDate) -> String {
    format!("{}.html", export_stem(selection, today))
}

fn export_stem(selection: &FilterSelection, today: NaiveDate) -> String {
    let department = match selection.values(Field::Department) {
        None => "all-departments".to_string(),
        Some(values) if values.len() == 1 => values.iter().map(|v| kebab_case(v)).collect(),
        Some(_) => "multiple-departments".to_string(),
    };
    let period = match selection.values(Field::Month) {
        None => "all-periods".to_string(),
        Some(values) if values.len() == 1 => values.iter().map(|v| kebab_case(v)).collect(),
        Some(_) => "multiple-periods".to_string(),
    };

    format!("aws-cost-{}-{}-{}", department, period, today.format("%Y-%m-%d"))
}

pub fn top_n_filename(report: &TopNReport) -> String {
    format!("{}-report.csv", report.kind.id())
}

/// Name for a rasterized chart; rendering the image itself happens elsewhere
pub fn chart_image_filename(title: &str, kind: ChartKind) -> String {
    format!("{}-{}-chart.png", kebab_case(title), kind.as_str())
}

pub fn records_csv(records: &[CostRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in records {
        let cost = format!("{:.2}", record.cost);
        writer.write_record([
            record.month.as_str(),
            record.department.as_str(),
            record.project.as_str(),
            record.service.as_str(),
            cost.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::export(format!("Failed to finish CSV: {}", e)))
}

pub fn top_n_csv(report: &TopNReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Rank", "Name", "Cost"])?;
    for entry in &report.entries {
        writer.write_record([
            entry.rank.to_string(),
            entry.name.clone(),
            format!("{:.2}", entry.cost),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::export(format!("Failed to finish CSV: {}", e)))
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn filter_label(field: Field) -> &'static str {
    match field {
        Field::Month => "Time Range",
        _ => field.label(),
    }
}

fn all_label(field: Field) -> &'static str {
    match field {
        Field::Month => "All Periods",
        Field::Department => "All Departments",
        Field::Project => "All Projects",
        Field::Service => "All Services",
        _ => "All",
    }
}

const REPORT_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.header { color: #f97316; border-bottom: 2px solid #f97316; padding-bottom: 10px; margin-bottom: 20px; }
.summary { background: #f8f9fa; padding: 15px; margin: 20px 0; border-radius: 5px; }
.summary-item { display: inline-block; margin: 10px 20px 10px 0; }
.summary-label { font-weight: bold; color: #666; }
.summary-value { font-size: 18px; color: #333; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f97316; color: white; }
tr:nth-child(even) { background-color: #f9f9f9; }
.filters { background: #e3f2fd; padding: 10px; margin: 10px 0; border-radius: 5px; }";

/// Render the printable report for the filtered records
pub fn html_report(records: &[CostRecord], selection: &FilterSelection, generated: NaiveDate) -> String {
    let metrics = summary(records);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>AWS Cost Report</title>\n");
    html.push_str(&format!("<style>\n{}\n</style>\n</head>\n<body>\n", REPORT_STYLE));

    html.push_str("<div class=\"header\">\n<h1>AWS Cost Report</h1>\n");
    html.push_str(&format!(
        "<p>Generated on {}</p>\n</div>\n",
        generated.format("%Y-%m-%d")
    ));

    html.push_str("<div class=\"filters\">\n<h3>Applied Filters:</h3>\n");
    let mut shown: Vec<Field> = Field::REQUIRED.to_vec();
    shown.extend(selection.active().map(|(field, _)| field).filter(|f| f.is_optional()));
    for field in shown {
        let value = match selection.values(field) {
            Some(values) => values.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", "),
            None => all_label(field).to_string(),
        };
        html.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            filter_label(field),
            escape_html(&value)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"summary\">\n");
    for (label, value) in [
        ("Total Cost", format!("${:.2}", metrics.total_cost)),
        ("Records", metrics.record_count.to_string()),
        ("Departments", metrics.departments.to_string()),
        ("Services", metrics.services.to_string()),
    ] {
        html.push_str(&format!(
            "<div class=\"summary-item\"><div class=\"summary-label\">{}</div><div class=\"summary-value\">{}</div></div>\n",
            label, value
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<table>\n<thead>\n<tr>");
    for header in CSV_HEADER {
        html.push_str(&format!("<th>{}</th>", header));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for record in records {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>${:.2}</td></tr>\n",
            escape_html(&record.month),
            escape_html(&record.department),
            escape_html(&record.project),
            escape_html(&record.service),
            record.cost
        ));
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");

    html
}

/// Write `contents` to `path` via a temp file in the same directory
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let fail = |e: std::io::Error| Error::export(format!("Failed to write {}: {}", path.display(), e));

    let mut file = NamedTempFile::new_in(dir).map_err(fail)?;
    file.write_all(contents).map_err(fail)?;
    file.flush().map_err(fail)?;
    file.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

/// Resolve an export destination: a directory gets the default file name
pub fn resolve_target(target: &Path, default_name: &str) -> PathBuf {
    if target.is_dir() {
        target.join(default_name)
    } else {
        target.to_path_buf()
    }
}
