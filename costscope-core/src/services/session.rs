//! Dashboard session - the explicit application state
//!
//! Owns the base record collection, the filter selection, the group-by field
//! and the comparison toggle. Every view is derived on demand from these.
//!
//! Uploads are two-phase: `begin_upload` hands out a ticket and
//! `complete_upload` applies the parsed data only if no newer upload has
//! started since. A failed or superseded upload leaves the session untouched.

use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;

use crate::adapters::sample::sample_records;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{CostRecord, Field, FilterSelection, Insight};
use crate::services::aggregate::{self, ChartRow, ChartKind, SummaryMetrics};
use crate::services::comparison::{self, Comparison};
use crate::services::facets::{self, FacetValues};
use crate::services::filter;
use crate::services::insights::InsightGenerator;
use crate::services::parser::{CsvParser, DetectedColumns, ParseOutcome};

/// Generation token for one upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UploadTicket(u64);

/// Where the base records came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum DataSource {
    Sample,
    Upload(String),
}

/// Summary of an applied upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub loaded: usize,
    pub skipped: usize,
    /// Which header satisfied each column role
    pub columns: DetectedColumns,
}

pub struct DashboardSession {
    records: Vec<CostRecord>,
    source: DataSource,
    filters: FilterSelection,
    group_by: Field,
    chart_kind: ChartKind,
    compare_enabled: bool,
    parser: CsvParser,
    config: Config,
    latest_upload: u64,
}

impl DashboardSession {
    /// Start a session on the bundled sample data
    pub fn new(config: Config) -> Self {
        Self::with_records(config, sample_records(), DataSource::Sample)
    }

    /// Start a session on an already-parsed collection
    pub fn with_records(config: Config, records: Vec<CostRecord>, source: DataSource) -> Self {
        Self {
            records,
            source,
            filters: FilterSelection::new(),
            group_by: Field::Department,
            chart_kind: ChartKind::Bar,
            compare_enabled: false,
            parser: CsvParser::default(),
            config,
            latest_upload: 0,
        }
    }

    pub fn records(&self) -> &[CostRecord] {
        &self.records
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSelection {
        &mut self.filters
    }

    pub fn set_filters(&mut self, filters: FilterSelection) {
        self.filters = filters;
    }

    pub fn group_by(&self) -> Field {
        self.group_by
    }

    pub fn set_group_by(&mut self, field: Field) {
        self.group_by = field;
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
    }

    pub fn compare_enabled(&self) -> bool {
        self.compare_enabled
    }

    pub fn set_compare_enabled(&mut self, enabled: bool) {
        self.compare_enabled = enabled;
    }

    /// Start an upload, superseding any upload still in flight
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.latest_upload += 1;
        UploadTicket(self.latest_upload)
    }

    /// Parse `text` and replace the base records if `ticket` is still current
    ///
    /// Filters are kept across uploads.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        name: &str,
        text: &str,
    ) -> Result<UploadSummary> {
        self.check_ticket(ticket)?;
        let outcome = self.parser.parse(text)?;
        Ok(self.apply(outcome, name))
    }

    /// Read and apply a CSV file in one step
    pub fn upload_file(&mut self, path: &Path) -> Result<UploadSummary> {
        let ticket = self.begin_upload();
        let outcome = self.parser.load_file(path)?;
        self.check_ticket(ticket)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.apply(outcome, &name))
    }

    /// Go back to the bundled sample data
    pub fn reset_to_sample(&mut self) {
        self.latest_upload += 1;
        self.records = sample_records();
        self.source = DataSource::Sample;
    }

    fn check_ticket(&self, ticket: UploadTicket) -> Result<()> {
        if ticket.0 != self.latest_upload {
            return Err(Error::StaleUpload {
                ticket: ticket.0,
                latest: self.latest_upload,
            });
        }
        Ok(())
    }

    fn apply(&mut self, outcome: ParseOutcome, name: &str) -> UploadSummary {
        let summary = UploadSummary {
            loaded: outcome.records.len(),
            skipped: outcome.skipped,
            columns: outcome.columns,
        };
        self.records = outcome.records;
        self.source = DataSource::Upload(name.to_string());
        summary
    }

    // Derived views

    pub fn filtered(&self) -> Cow<'_, [CostRecord]> {
        filter::apply(&self.records, &self.filters)
    }

    /// Option lists come from the unfiltered base records
    pub fn facets(&self) -> FacetValues {
        facets::facets(&self.records)
    }

    pub fn summary(&self) -> SummaryMetrics {
        aggregate::summary(&self.filtered())
    }

    /// Chart rows for the current group-by field and chart kind
    pub fn chart(&self) -> Vec<ChartRow> {
        let records = self.filtered();
        let limits = &self.config.limits;
        match self.chart_kind {
            ChartKind::Bar => aggregate::bar_chart(&records, self.group_by, limits.bar_top)
                .into_iter()
                .map(ChartRow::from)
                .collect(),
            ChartKind::Pie => aggregate::pie_chart(&records, self.group_by, limits.pie_top)
                .into_iter()
                .map(ChartRow::from)
                .collect(),
            ChartKind::Line => aggregate::monthly_series(&records)
                .into_iter()
                .map(ChartRow::from)
                .collect(),
        }
    }

    pub fn comparison(&self) -> Comparison {
        comparison::compare(
            &self.filtered(),
            self.compare_enabled,
            self.config.limits.comparison_top,
        )
    }

    pub fn insights(&self) -> Vec<Insight> {
        InsightGenerator::new(self.config.thresholds).generate(&self.filtered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPLOAD: &str = "month,department,project,service,cost\n\
                          2024-01,Eng,Alpha,EC2,100\n\
                          2024-02,Eng,Alpha,EC2,150\n";

    #[test]
    fn test_starts_on_sample_data() {
        let session = DashboardSession::new(Config::default());
        assert_eq!(session.source(), &DataSource::Sample);
        assert!(!session.records().is_empty());
        assert_eq!(session.group_by(), Field::Department);
        assert!(!session.compare_enabled());
    }

    #[test]
    fn test_upload_replaces_records_and_keeps_filters() {
        let mut session = DashboardSession::new(Config::default());
        session.filters_mut().select(Field::Department, ["Eng"]);

        let ticket = session.begin_upload();
        let summary = session.complete_upload(ticket, "costs.csv", UPLOAD).unwrap();

        assert_eq!((summary.loaded, summary.skipped), (2, 0));
        assert_eq!(summary.columns.index(Field::Service), Some(3));
        assert_eq!(summary.columns.cost.as_ref().map(|m| m.header.as_str()), Some("cost"));
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.source(), &DataSource::Upload("costs.csv".to_string()));
        assert!(session.filters().values(Field::Department).is_some());
        assert_eq!(session.filtered().len(), 2);
    }

    #[test]
    fn test_stale_ticket_rejected() {
        let mut session = DashboardSession::new(Config::default());
        let first = session.begin_upload();
        let second = session.begin_upload();

        let err = session.complete_upload(first, "old.csv", UPLOAD).unwrap_err();
        assert!(matches!(err, Error::StaleUpload { ticket: 1, latest: 2 }));
        assert_eq!(session.source(), &DataSource::Sample);

        session.complete_upload(second, "new.csv", UPLOAD).unwrap();
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn test_failed_upload_keeps_previous_data() {
        let mut session = DashboardSession::new(Config::default());
        let before = session.records().to_vec();

        let ticket = session.begin_upload();
        let err = session
            .complete_upload(ticket, "bad.csv", "month,department\n2024-01,Eng\n")
            .unwrap_err();

        assert!(matches!(err, Error::MissingColumns { .. }));
        assert_eq!(session.records(), before.as_slice());
    }

    #[test]
    fn test_reset_to_sample_invalidates_pending_upload() {
        let mut session = DashboardSession::new(Config::default());
        let ticket = session.begin_upload();
        session.reset_to_sample();

        assert!(session.complete_upload(ticket, "late.csv", UPLOAD).is_err());
        assert_eq!(session.source(), &DataSource::Sample);
    }

    #[test]
    fn test_derived_views_follow_state() {
        let mut session = DashboardSession::new(Config::default());
        let ticket = session.begin_upload();
        session.complete_upload(ticket, "costs.csv", UPLOAD).unwrap();

        assert_eq!(session.summary().total_cost, 250.0);
        assert_eq!(session.comparison(), Comparison::Disabled);
        session.set_compare_enabled(true);
        assert!(session.comparison().result().is_some());

        session.set_chart_kind(ChartKind::Line);
        let keys: Vec<String> = session.chart().into_iter().map(|b| b.key).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02"]);

        assert_eq!(session.insights()[0].value.as_deref(), Some("+50.0%"));

        session.set_filters(FilterSelection::new().with(Field::Month, ["2024-01"]));
        assert_eq!(session.summary().total_cost, 100.0);
        assert_eq!(session.facets().get(Field::Month).len(), 2);
    }
}
