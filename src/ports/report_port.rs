//! Report generation port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AttributionError;
use std::path::Path;

/// Port for writing analysis reports.
pub trait ReportPort {
    fn render(&self, report: &AnalysisReport) -> Result<String, AttributionError>;

    /// Default implementation: renders and writes the result to `output_path`.
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), AttributionError> {
        let content = self.render(report)?;
        std::fs::write(output_path, content).map_err(|e| AttributionError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })
    }
}
