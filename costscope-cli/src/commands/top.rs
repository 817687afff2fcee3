//! Top command - ranked top-N reports

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use crate::output::{create_table, format_currency, number_cell};
use costscope_core::services::aggregate::top_n;
use costscope_core::services::{TopNKind, TopNReport};

pub fn run(data: &DataArgs, report: Option<TopNKind>, json: bool) -> Result<()> {
    let session = open_session("top", data)?;
    let records = session.filtered();

    let kinds: Vec<TopNKind> = match report {
        Some(kind) => vec![kind],
        None => TopNKind::ALL.to_vec(),
    };
    let reports: Vec<TopNReport> = kinds.into_iter().map(|kind| top_n(&records, kind)).collect();

    if json {
        return print_json(&reports);
    }

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_report(report);
    }

    Ok(())
}

fn print_report(report: &TopNReport) {
    println!("{} {}", report.kind.title().bold(), format!("({})", report.kind.id()).dimmed());

    if report.entries.is_empty() {
        println!("  No data");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Rank", "Name", "Cost", "Share"]);
    for entry in &report.entries {
        table.add_row(vec![
            number_cell(format!("#{}", entry.rank)),
            comfy_table::Cell::new(&entry.name),
            number_cell(format_currency(entry.cost)),
            number_cell(format!("{:.1}%", entry.share_pct)),
        ]);
    }
    println!("{}", table);
}
