//! Costscope CLI - cost reports in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{
    compare, config, drill, export, facets, insights, logs, report, sample, summary, top, DataArgs,
};
use costscope_core::services::{ChartKind, TopNKind};
use costscope_core::Field;

/// Costscope - slice, compare and export cost reports
#[derive(Parser)]
#[command(name = "cscope", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show total cost and distinct counts
    Summary {
        #[command(flatten)]
        data: DataArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Break costs down by a field
    Report {
        #[command(flatten)]
        data: DataArgs,
        /// Field to group by
        #[arg(short = 'g', long, default_value = "department")]
        group_by: Field,
        /// Chart view: bar (top entries), pie (shares) or line (by month)
        #[arg(short, long, default_value = "bar")]
        chart: ChartKind,
        /// Show at most N rows
        #[arg(long)]
        top: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ranked top-N reports
    Top {
        #[command(flatten)]
        data: DataArgs,
        /// Report to show (top-5-projects, top-10-services, top-departments); all if omitted
        #[arg(short, long)]
        report: Option<TopNKind>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare the earlier half of the months against the later half
    Compare {
        #[command(flatten)]
        data: DataArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect spikes, drops and concentration
    Insights {
        #[command(flatten)]
        data: DataArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the distinct values available for filtering
    Facets {
        #[command(flatten)]
        data: DataArgs,
        /// Only this field
        #[arg(long)]
        field: Option<Field>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Break one department, project or service down by service and month
    Drill {
        /// Value to drill into, e.g. "Engineering"
        key: String,
        #[command(flatten)]
        data: DataArgs,
        /// Field the value belongs to
        #[arg(short = 'g', long, default_value = "department")]
        by: Field,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the selection to a file
    Export {
        #[command(subcommand)]
        command: export::ExportCommands,
    },

    /// Write the template CSV (or the bundled sample dataset)
    Sample {
        /// Output file or directory (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the full bundled dataset instead of the template
        #[arg(long)]
        dataset: bool,
        /// Print the bundled dataset as JSON
        #[arg(long, conflicts_with = "output")]
        json: bool,
    },

    /// View and change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Whether the command asked for JSON output
    fn json(&self) -> bool {
        match self {
            Commands::Summary { json, .. }
            | Commands::Report { json, .. }
            | Commands::Top { json, .. }
            | Commands::Compare { json, .. }
            | Commands::Insights { json, .. }
            | Commands::Facets { json, .. }
            | Commands::Drill { json, .. }
            | Commands::Sample { json, .. } => *json,
            Commands::Export { command } => command.json(),
            Commands::Config { command } => command.json(),
            Commands::Logs { command } => command.json(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.json();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !json || commands::print_json_error(&e).is_err() {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Summary { data, json } => summary::run(&data, json),
        Commands::Report { data, group_by, chart, top, json } => report::run(&data, group_by, chart, top, json),
        Commands::Top { data, report, json } => top::run(&data, report, json),
        Commands::Compare { data, json } => compare::run(&data, json),
        Commands::Insights { data, json } => insights::run(&data, json),
        Commands::Facets { data, field, json } => facets::run(&data, field, json),
        Commands::Drill { key, data, by, json } => drill::run(&data, by, &key, json),
        Commands::Export { command } => export::run(command),
        Commands::Sample { output, dataset, json } => sample::run(output, dataset, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_with_filters() {
        let cli = Cli::try_parse_from([
            "cscope", "report", "costs.csv", "-g", "service", "--chart", "pie", "-d", "Eng,Ops",
            "--filter", "owner=alice",
        ])
        .unwrap();

        match cli.command {
            Commands::Report { data, group_by, chart, .. } => {
                assert_eq!(group_by, Field::Service);
                assert_eq!(chart, ChartKind::Pie);
                assert_eq!(data.file, Some(PathBuf::from("costs.csv")));
                assert_eq!(data.departments, vec!["Eng", "Ops"]);
                assert_eq!(data.filters, vec!["owner=alice"]);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_parse_drill_and_export() {
        let cli = Cli::try_parse_from(["cscope", "drill", "Atlas", "-g", "project"]).unwrap();
        assert!(matches!(cli.command, Commands::Drill { ref key, by: Field::Project, .. } if key == "Atlas"));

        let cli = Cli::try_parse_from(["cscope", "export", "top", "--report", "top-10-services"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export {
                command: export::ExportCommands::Top { report: TopNKind::Services, .. }
            }
        ));

        assert!(Cli::try_parse_from(["cscope", "report", "-g", "colour"]).is_err());
    }

    #[test]
    fn test_json_flag_detected_across_commands() {
        let cli = Cli::try_parse_from(["cscope", "summary", "--json"]).unwrap();
        assert!(cli.command.json());

        let cli = Cli::try_parse_from(["cscope", "export", "csv", "--json", "-o", "out"]).unwrap();
        assert!(cli.command.json());

        let cli = Cli::try_parse_from(["cscope", "config", "set", "spike-pct", "25"]).unwrap();
        assert!(!cli.command.json());

        let cli = Cli::try_parse_from(["cscope", "logs", "stats", "--json"]).unwrap();
        assert!(cli.command.json());
    }

    #[test]
    fn test_sample_json_conflicts_with_output() {
        assert!(Cli::try_parse_from(["cscope", "sample", "--json", "-o", "out.csv"]).is_err());
        assert!(Cli::try_parse_from(["cscope", "sample", "--dataset", "-o", "out"]).is_ok());
    }
}
