//! Report command - costs grouped by a field, in bar, pie or line form

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::{open_session, print_json, DataArgs};
use crate::output::{create_table, format_currency, number_cell};
use costscope_core::services::export::chart_image_filename;
use costscope_core::services::{ChartKind, ChartRow};
use costscope_core::Field;

#[derive(Serialize)]
struct ReportOutput {
    group_by: Field,
    chart: ChartKind,
    /// File name a rendered chart image would be saved under
    image_filename: String,
    rows: Vec<ChartRow>,
}

fn chart_title(group_by: Field, chart: ChartKind) -> String {
    match chart {
        ChartKind::Line => "Cost Trend by Month".to_string(),
        _ => format!("Cost by {}", group_by.label()),
    }
}

pub fn run(data: &DataArgs, group_by: Field, chart: ChartKind, top: Option<usize>, json: bool) -> Result<()> {
    let mut session = open_session("report", data)?;
    session.set_group_by(group_by);
    session.set_chart_kind(chart);

    let mut rows = session.chart();
    if let Some(top) = top {
        rows.truncate(top);
    }

    let title = chart_title(group_by, chart);
    let output = ReportOutput {
        group_by,
        chart,
        image_filename: chart_image_filename(&title, chart),
        rows,
    };

    if json {
        return print_json(&output);
    }

    println!("{}", title.bold());
    println!();

    if output.rows.is_empty() {
        println!("No records match the current filters.");
        return Ok(());
    }

    let label = match chart {
        ChartKind::Line => Field::Month.label(),
        _ => group_by.label(),
    };
    let mut table = create_table();
    if chart == ChartKind::Pie {
        table.set_header(vec![label, "Cost", "Share"]);
    } else {
        table.set_header(vec![label, "Cost"]);
    }

    for row in &output.rows {
        let mut cells = vec![
            comfy_table::Cell::new(&row.key),
            number_cell(format_currency(row.total)),
        ];
        if let Some(share) = row.share_pct {
            cells.push(number_cell(format!("{:.1}%", share)));
        }
        table.add_row(cells);
    }

    println!("{}", table);
    Ok(())
}
