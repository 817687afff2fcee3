//! Facets command - distinct values available for filtering

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use costscope_core::services::facets::unique_values;
use costscope_core::Field;

pub fn run(data: &DataArgs, field: Option<Field>, json: bool) -> Result<()> {
    let session = open_session("facets", data)?;

    if let Some(field) = field {
        let values = unique_values(session.records(), field);
        if json {
            return print_json(&values);
        }
        for value in values {
            println!("{}", value);
        }
        return Ok(());
    }

    let facets = session.facets();
    if json {
        return print_json(&facets.values);
    }

    for (field, values) in &facets.values {
        println!("{} ({})", field.label().bold(), values.len());
        println!("  {}", values.join(", "));
    }

    Ok(())
}
