//! Logs command - inspect and prune the event log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde::Serialize;

use super::{get_app_dir, print_json};
use crate::output::{confirm, create_table, format_size, format_timestamp, number_cell};
use costscope_core::services::logging::now_ms;
use costscope_core::services::LogEntry;
use costscope_core::{EntryPoint, LoggingService};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failed loads and exports
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old log entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entry counts per event and the database location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl LogsCommands {
    pub fn json(&self) -> bool {
        match self {
            LogsCommands::List { json, .. }
            | LogsCommands::Clear { json, .. }
            | LogsCommands::Stats { json } => *json,
        }
    }
}

#[derive(Debug, Serialize)]
struct LogStats {
    total_entries: u64,
    error_count: u64,
    events: Vec<EventCount>,
    database_path: String,
    database_size_bytes: u64,
}

#[derive(Debug, Serialize)]
struct EventCount {
    event: String,
    count: u64,
}

pub fn run(command: LogsCommands) -> Result<()> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    let service = LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, errors, json } => list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&service, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn list(service: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    println!("{}", entries_table(&entries));
    Ok(())
}

/// One row per entry; failed entries show their message in red
fn entries_table(entries: &[LogEntry]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Time", "Event", "Command", "Source", "Rows", "Error"]);

    for entry in entries {
        let error = entry
            .error_message
            .as_deref()
            .map(|message| message.red().to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(format_timestamp(entry.timestamp)),
            Cell::new(&entry.event),
            Cell::new(entry.command.as_deref().unwrap_or_default()),
            Cell::new(entry.source.as_deref().unwrap_or_default()),
            number_cell(entry.record_count.map(|n| n.to_string()).unwrap_or_default()),
            Cell::new(error),
        ]);
    }
    table
}

fn cutoff_ms(now: i64, older_than_days: u64) -> i64 {
    let days = i64::try_from(older_than_days).unwrap_or(i64::MAX);
    now.saturating_sub(days.saturating_mul(DAY_MS))
}

fn clear(service: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    let prompt = format!("Delete log entries older than {} days?", older_than_days);
    if !force && !json && !confirm(&prompt)? {
        println!("Cancelled.");
        return Ok(());
    }

    let deleted = service.delete_before(cutoff_ms(now_ms(), older_than_days))?;

    if json {
        return print_json(&serde_json::json!({ "deleted": deleted }));
    }
    println!("Deleted {} log entries", deleted);
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let db_path = service.db_path();
    let stats = LogStats {
        total_entries: service.count()?,
        error_count: service.error_count()?,
        events: service
            .event_counts()?
            .into_iter()
            .map(|(event, count)| EventCount { event, count })
            .collect(),
        database_path: db_path.display().to_string(),
        database_size_bytes: std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0),
    };

    if json {
        return print_json(&stats);
    }

    println!("{}", "Event Log".bold());
    println!("  Entries: {} ({} failed)", stats.total_entries, stats.error_count);
    println!(
        "  Database: {} ({})",
        stats.database_path,
        format_size(stats.database_size_bytes)
    );

    if !stats.events.is_empty() {
        let mut table = create_table();
        table.set_header(vec!["Event", "Count"]);
        for e in &stats.events {
            table.add_row(vec![Cell::new(&e.event), number_cell(e.count.to_string())]);
        }
        println!("{}", table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_ms() {
        assert_eq!(cutoff_ms(10 * DAY_MS, 3), 7 * DAY_MS);
        assert_eq!(cutoff_ms(DAY_MS, 0), DAY_MS);
        assert!(cutoff_ms(0, u64::MAX) < 0);
    }

    #[test]
    fn test_entries_table_has_row_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
        service.log_command("summary").unwrap();
        service
            .log_error("csv_load_failed", "No valid data found in CSV", None)
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        let table = entries_table(&entries);
        assert_eq!(table.row_iter().count(), 2);
        assert!(table.to_string().contains("csv_load_failed"));
    }
}
