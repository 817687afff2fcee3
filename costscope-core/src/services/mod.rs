//! Service layer - the data pipeline
//!
//! Pipeline stages are pure functions over record slices. `DashboardSession`
//! holds the state they are driven from.

pub mod aggregate;
pub mod comparison;
pub mod export;
pub mod facets;
pub mod filter;
mod insights;
pub mod logging;
pub mod parser;
mod session;

pub use aggregate::{
    ChartKind, ChartRow, DrillDown, PieSlice, ServiceBreakdown, SummaryMetrics, TopNEntry,
    TopNKind, TopNReport,
};
pub use comparison::{Comparison, ComparisonResult, ProjectChange};
pub use facets::FacetValues;
pub use insights::InsightGenerator;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use parser::{ColumnSchema, CsvParser, DetectedColumns, ParseOutcome};
pub use session::{DashboardSession, DataSource, UploadSummary, UploadTicket};
