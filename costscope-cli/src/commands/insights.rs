//! Insights command - heuristic observations about the selection

use anyhow::Result;
use colored::Colorize;

use super::{open_session, print_json, DataArgs};
use costscope_core::{Insight, Severity};

fn badge(insight: &Insight) -> String {
    let label = format!("[{}]", insight.severity.as_str());
    match insight.severity {
        Severity::High => label.red().bold().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low => label.blue().to_string(),
    }
}

pub fn run(data: &DataArgs, json: bool) -> Result<()> {
    let session = open_session("insights", data)?;
    let insights = session.insights();

    if json {
        return print_json(&insights);
    }

    println!("{}", "Smart Insights".bold());
    println!();

    if insights.is_empty() {
        println!("No significant patterns detected in the current data.");
        return Ok(());
    }

    for insight in &insights {
        match &insight.value {
            Some(value) => println!("{} {} {}", badge(insight), insight.title.bold(), value.cyan()),
            None => println!("{} {}", badge(insight), insight.title.bold()),
        }
        println!("    {}", insight.description);
    }

    Ok(())
}
