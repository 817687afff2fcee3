//! CLI command implementations

pub mod compare;
pub mod config;
pub mod drill;
pub mod export;
pub mod facets;
pub mod insights;
pub mod logs;
pub mod report;
pub mod sample;
pub mod summary;
pub mod top;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use costscope_core::config::Config;
use costscope_core::services::filter::count_matching;
use costscope_core::services::{DataSource, DetectedColumns, UploadSummary};
use costscope_core::{
    DashboardSession, EntryPoint, Error as CoreError, Field, FilterSelection, LogEvent, LoggingService,
    OperationResult,
};

use crate::output::{create_table, warning};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the app directory from COSTSCOPE_DIR or ~/.costscope
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("COSTSCOPE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".costscope"))
        .context("Could not find home directory (set COSTSCOPE_DIR)")
}

pub fn load_config() -> Result<Config> {
    let app_dir = get_app_dir()?;
    Config::load(&app_dir).context("Failed to load settings")
}

/// Dataset and filter options shared by every data command
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// CSV file to load, `-` for stdin (default: configured dataset or bundled sample)
    pub file: Option<PathBuf>,

    /// Only these departments (repeatable or comma-separated)
    #[arg(long = "department", short = 'd', value_delimiter = ',')]
    pub departments: Vec<String>,

    /// Only these projects
    #[arg(long = "project", short = 'p', value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Only these services
    #[arg(long = "service", short = 's', value_delimiter = ',')]
    pub services: Vec<String>,

    /// Only these months (YYYY-MM)
    #[arg(long = "month", short = 'm', value_delimiter = ',')]
    pub months: Vec<String>,

    /// Filter on any field, e.g. `owner=alice` or `category=Compute,Storage`
    #[arg(long = "filter", value_name = "FIELD=VALUES")]
    pub filters: Vec<String>,

    /// Show which CSV header was matched to each column
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl DataArgs {
    /// Build the filter selection from the flags
    pub fn selection(&self) -> Result<FilterSelection> {
        let mut selection = FilterSelection::new()
            .with(Field::Department, self.departments.iter().cloned())
            .with(Field::Project, self.projects.iter().cloned())
            .with(Field::Service, self.services.iter().cloned())
            .with(Field::Month, self.months.iter().cloned());

        for raw in &self.filters {
            let (field, values) = raw
                .split_once('=')
                .with_context(|| format!("Invalid filter '{}': expected FIELD=VALUES", raw))?;
            let field: Field = field.parse()?;
            selection.select(field, values.split(','));
        }

        Ok(selection)
    }
}

/// Build a session from the data arguments
///
/// Loads the requested CSV (logging the outcome) and applies the filter flags.
pub fn open_session(command: &str, data: &DataArgs) -> Result<DashboardSession> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command(command));

    let config = load_config()?;
    let selection = data.selection()?;
    let path = data.file.clone().or_else(|| config.default_dataset.clone());
    let mut session = DashboardSession::new(config);

    let loaded = match path {
        None => Ok(None),
        Some(path) => load_into(&mut session, &path).map(Some),
    };

    match loaded {
        Ok(summary) => {
            let mut event = LogEvent::new("csv_loaded")
                .with_command(command)
                .with_record_count(session.records().len());
            event = match session.source() {
                DataSource::Sample => event.with_source("sample"),
                DataSource::Upload(_) => event.with_source("upload"),
            };
            log_event(&logger, event);

            if let Some(summary) = summary {
                report_upload(&summary, data.verbose);
            }
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("csv_load_failed")
                    .with_command(command)
                    .with_source("upload")
                    .with_error(format!("{:#}", e))
                    .with_error_details(failure_kind(&e)),
            );
            return Err(e);
        }
    }

    if !selection.is_empty() && count_matching(session.records(), &selection) == 0 {
        warning("No records match the selected filters");
    }
    session.set_filters(selection);
    Ok(session)
}

/// Load a CSV path (or `-` for stdin) into the session
fn load_into(session: &mut DashboardSession, path: &Path) -> Result<UploadSummary> {
    let result = if path == Path::new("-") {
        let text = read_stdin()?;
        let ticket = session.begin_upload();
        session.complete_upload(ticket, "stdin", &text)
    } else {
        session.upload_file(path)
    };

    result.map_err(|e| {
        let wording = failure_wording(&e, path);
        anyhow::Error::new(e).context(wording)
    })
}

/// Rejected uploads point at the template; anything else is a plain load failure
fn failure_wording(err: &CoreError, path: &Path) -> String {
    if err.is_input_error() {
        format!(
            "{} is not a usable cost CSV (run `cscope sample` for a template)",
            path.display()
        )
    } else {
        format!("Failed to load {}", path.display())
    }
}

fn failure_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<CoreError>() {
        Some(e) if e.is_input_error() => "input",
        _ => "system",
    }
}

fn report_upload(summary: &UploadSummary, verbose: bool) {
    if summary.skipped > 0 {
        warning(&format!(
            "Skipped {} row(s) with missing fields or unreadable costs",
            summary.skipped
        ));
    }

    if verbose {
        let mut table = create_table();
        table.set_header(vec!["Column", "CSV header"]);
        for (role, header) in column_rows(&summary.columns) {
            table.add_row(vec![role, header]);
        }
        eprintln!("{}", table);
    }
}

/// Role label and matched header, in field order with cost last
fn column_rows(columns: &DetectedColumns) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = columns
        .fields
        .iter()
        .map(|(field, m)| (field.label().to_string(), m.header.clone()))
        .collect();
    if let Some(m) = &columns.cost {
        rows.push(("Cost".to_string(), m.header.clone()));
    }
    rows
}

fn read_stdin() -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        anyhow::bail!("No CSV piped on stdin");
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read CSV from stdin")?;
    Ok(buffer)
}

/// Print a value as pretty JSON inside the success envelope
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", envelope_json(&OperationResult::ok(value))?);
    Ok(())
}

/// Print a failed command as the JSON error envelope
pub fn print_json_error(err: &anyhow::Error) -> Result<()> {
    println!("{}", envelope_json(&OperationResult::<()>::fail(format!("{:#}", err)))?);
    Ok(())
}

fn envelope_json<T: serde::Serialize>(result: &OperationResult<T>) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
