//! Summary command - headline totals for the current selection

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use crate::output::{create_table, format_currency};
use costscope_core::services::DataSource;

pub fn run(data: &DataArgs, json: bool) -> Result<()> {
    let session = open_session("summary", data)?;
    let summary = session.summary();

    if json {
        return print_json(&summary);
    }

    let source = match session.source() {
        DataSource::Sample => "bundled sample data".to_string(),
        DataSource::Upload(name) => name.clone(),
    };
    println!("{} ({})", "Cost Summary".bold(), source.dimmed());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Total Cost".to_string(), format_currency(summary.total_cost)]);
    table.add_row(vec!["Records".to_string(), summary.record_count.to_string()]);
    table.add_row(vec!["Departments".to_string(), summary.departments.to_string()]);
    table.add_row(vec!["Projects".to_string(), summary.projects.to_string()]);
    table.add_row(vec!["Services".to_string(), summary.services.to_string()]);
    println!("{}", table);

    let active: Vec<String> = session
        .filters()
        .active()
        .map(|(field, values)| {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            format!("{}: {}", field.label(), values.join(", "))
        })
        .collect();
    if !active.is_empty() {
        println!();
        println!("{} {}", "Filtered".yellow(), active.join("; "));
    }

    Ok(())
}
