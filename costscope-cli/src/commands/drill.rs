//! Drill command - one bucket broken down by service and month

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use crate::output::{create_table, format_currency, number_cell, warning};
use costscope_core::services::aggregate::drill_down;
use costscope_core::Field;

pub fn run(data: &DataArgs, field: Field, key: &str, json: bool) -> Result<()> {
    let session = open_session("drill", data)?;
    let detail = drill_down(&session.filtered(), field, key);

    if json {
        return print_json(&detail);
    }

    if detail.record_count == 0 {
        warning(&format!("No records with {} = {}", field.label(), key));
        return Ok(());
    }

    println!(
        "{} {}  {} across {} record(s)",
        format!("{}:", field.label()).bold(),
        detail.key,
        format_currency(detail.total).green(),
        detail.record_count
    );
    println!();

    let mut services = create_table();
    services.set_header(vec!["Service", "Cost", "Records"]);
    for row in &detail.services {
        services.add_row(vec![
            comfy_table::Cell::new(&row.service),
            number_cell(format_currency(row.cost)),
            number_cell(row.count.to_string()),
        ]);
    }
    println!("{}", services);
    println!();

    let mut months = create_table();
    months.set_header(vec!["Month", "Cost"]);
    for bucket in &detail.months {
        months.add_row(vec![
            comfy_table::Cell::new(&bucket.key),
            number_cell(format_currency(bucket.total)),
        ]);
    }
    println!("{}", months);

    Ok(())
}
