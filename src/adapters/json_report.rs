//! JSON report adapter: the full `AnalysisReport` as pretty-printed JSON.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AttributionError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &AnalysisReport) -> Result<String, AttributionError> {
        serde_json::to_string_pretty(report).map_err(|e| AttributionError::Report {
            reason: format!("JSON serialization failed: {}", e),
        })
    }
}
