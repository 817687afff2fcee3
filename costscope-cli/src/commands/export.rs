//! Export command - write the selection as CSV, a top-N report or HTML

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;

use super::{get_logger, log_event, open_session, print_json, DataArgs};
use crate::output::success;
use costscope_core::services::aggregate::top_n;
use costscope_core::services::export::{
    csv_filename, html_filename, html_report, records_csv, resolve_target, top_n_csv, top_n_filename,
    write_atomic,
};
use costscope_core::services::TopNKind;
use costscope_core::LogEvent;

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the filtered records as CSV
    Csv {
        #[command(flatten)]
        data: DataArgs,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a ranked top-N report as CSV
    Top {
        #[command(flatten)]
        data: DataArgs,
        /// Report to export
        #[arg(short, long, default_value = "top-5-projects")]
        report: TopNKind,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a printable HTML report (print it to PDF from a browser)
    Html {
        #[command(flatten)]
        data: DataArgs,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ExportCommands {
    pub fn json(&self) -> bool {
        match self {
            ExportCommands::Csv { json, .. }
            | ExportCommands::Top { json, .. }
            | ExportCommands::Html { json, .. } => *json,
        }
    }
}

fn target(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) => resolve_target(path, default_name),
        None => PathBuf::from(default_name),
    }
}

pub fn run(command: ExportCommands) -> Result<()> {
    let json = command.json();
    let (kind, data) = match &command {
        ExportCommands::Csv { data, .. } => ("csv", data),
        ExportCommands::Top { data, .. } => ("top", data),
        ExportCommands::Html { data, .. } => ("html", data),
    };

    let session = open_session("export", data)?;
    let records = session.filtered();
    let today = Local::now().date_naive();

    let written = match &command {
        ExportCommands::Csv { output, .. } => {
            let path = target(output.as_deref(), &csv_filename(session.filters(), today));
            records_csv(&records).and_then(|bytes| write_atomic(&path, &bytes)).map(|_| (path, records.len()))
        }
        ExportCommands::Top { report, output, .. } => {
            let report = top_n(&records, *report);
            let path = target(output.as_deref(), &top_n_filename(&report));
            top_n_csv(&report)
                .and_then(|bytes| write_atomic(&path, &bytes))
                .map(|_| (path, report.entries.len()))
        }
        ExportCommands::Html { output, .. } => {
            let path = target(output.as_deref(), &html_filename(session.filters(), today));
            let html = html_report(&records, session.filters(), today);
            write_atomic(&path, html.as_bytes()).map(|_| (path, records.len()))
        }
    };

    let logger = get_logger();
    let (path, rows) = match written {
        Ok(done) => {
            log_event(
                &logger,
                LogEvent::new("export_completed")
                    .with_command(format!("export {}", kind))
                    .with_record_count(done.1),
            );
            done
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("export_failed")
                    .with_command(format!("export {}", kind))
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    if json {
        return print_json(&serde_json::json!({
            "path": path.to_string_lossy(),
            "rows": rows,
        }));
    }

    success(&format!("Exported {} row(s) to {}", rows, path.display()));
    Ok(())
}
