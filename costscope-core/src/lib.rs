//! Costscope Core - cost report data pipeline
//!
//! Turns a CSV of cost line items into filtered, grouped and compared views:
//!
//! - **domain**: records, fields, filter selections, insights, errors
//! - **services**: parser, filter engine, aggregator, comparator, insight
//!   generator, exporters, the dashboard session and the event log
//! - **adapters**: bundled sample data
//! - **config**: settings.json and environment overrides

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod services;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{AggregatedBucket, CostRecord, Field, FilterSelection, Insight, InsightKind, Severity};
pub use services::{DashboardSession, EntryPoint, LogEvent, LoggingService};
