//! Compare command - earlier half of the months against the later half

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use crate::output::{colored_change, create_table, format_currency, info, number_cell};
use costscope_core::services::Comparison;

pub fn run(data: &DataArgs, json: bool) -> Result<()> {
    let mut session = open_session("compare", data)?;
    session.set_compare_enabled(true);
    let comparison = session.comparison();

    if json {
        return print_json(&comparison);
    }

    let result = match &comparison {
        Comparison::Ready(result) => result,
        Comparison::InsufficientData | Comparison::Disabled => {
            info("Need at least 2 months of data for comparison");
            return Ok(());
        }
    };

    println!("{}", "Historical Trends Comparison".bold());
    println!();

    let mut periods = create_table();
    periods.set_header(vec!["Period", "Months", "Total"]);
    periods.add_row(vec![
        comfy_table::Cell::new("Previous"),
        comfy_table::Cell::new(result.previous_months.join(", ")),
        number_cell(format_currency(result.previous_total)),
    ]);
    periods.add_row(vec![
        comfy_table::Cell::new("Current"),
        comfy_table::Cell::new(result.current_months.join(", ")),
        number_cell(format_currency(result.current_total)),
    ]);
    println!("{}", periods);
    println!("Overall change: {}", colored_change(result.overall_change_pct));
    println!();

    if result.changes.is_empty() {
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Project", "Previous", "Current", "Delta", "Change"]);
    for change in &result.changes {
        let pct = if change.is_new {
            "new".cyan().to_string()
        } else {
            colored_change(change.change_pct)
        };
        table.add_row(vec![
            comfy_table::Cell::new(&change.project),
            number_cell(format_currency(change.previous)),
            number_cell(format_currency(change.current)),
            number_cell(format_currency(change.absolute_delta)),
            number_cell(pct),
        ]);
    }
    println!("{}", table);

    Ok(())
}
