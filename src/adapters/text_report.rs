//! Plain-text analyst report implementing ReportPort.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AttributionError;
use crate::domain::factor::FactorModel;
use crate::domain::interpretation::{SizeTilt, StyleTilt};
use crate::domain::regression::Estimate;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn model_name(model: FactorModel) -> &'static str {
    match model {
        FactorModel::FamaFrench3 => "Fama-French three-factor model",
        FactorModel::Capm => "CAPM single-factor model",
    }
}

fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n{}\n", title, "-".repeat(title.len())));
}

fn estimate_row(out: &mut String, label: &str, e: &Estimate) {
    let flag = if e.is_significant() { " *" } else { "" };
    out.push_str(&format!(
        "  {:<8} {:>10.4} {:>10.4} {:>8.2}{}\n",
        label, e.value, e.std_error, e.t_stat, flag
    ));
}

fn render_data(out: &mut String, report: &AnalysisReport) {
    heading(out, "Data");
    let end = report
        .requested_end
        .map(|d| d.to_string())
        .unwrap_or_else(|| "latest".to_string());
    out.push_str(&format!("  Ticker:          {}\n", report.ticker));
    out.push_str(&format!("  Factor source:   {}\n", report.factor_source));
    out.push_str(&format!(
        "  Requested:       {} to {}\n",
        report.requested_start, end
    ));
    out.push_str(&format!(
        "  Sample:          {} to {} ({} months)\n",
        report.sample_start, report.sample_end, report.regression.observations
    ));
}

fn render_method(out: &mut String, report: &AnalysisReport) {
    heading(out, "Method");
    let labels: Vec<&str> = report
        .regression
        .loadings
        .iter()
        .map(|l| l.factor.label())
        .collect();
    out.push_str(&format!("  {}.\n", model_name(report.regression.model)));
    out.push_str(&format!(
        "  Monthly excess return regressed by OLS on {} with an intercept.\n",
        labels.join(", ")
    ));
    out.push_str("  Factor contribution = beta x mean factor return; annualized x12.\n");
}

fn render_results(out: &mut String, report: &AnalysisReport) {
    let reg = &report.regression;
    heading(out, "Results");
    out.push_str(&format!(
        "  {:<8} {:>10} {:>10} {:>8}\n",
        "Term", "Estimate", "Std Err", "t-stat"
    ));
    estimate_row(out, "Alpha", &reg.alpha);
    for loading in &reg.loadings {
        estimate_row(out, loading.factor.label(), &loading.beta);
    }
    out.push_str("  (* |t| >= 2)\n\n");
    out.push_str(&format!("  R-squared:            {:.4}\n", reg.r_squared));
    out.push_str(&format!(
        "  Adjusted R-squared:   {:.4}\n",
        reg.adjusted_r_squared
    ));
    out.push_str(&format!(
        "  Residual std error:   {:.4}\n",
        reg.residual_std_error
    ));
    out.push_str(&format!(
        "  Observations:         {} ({} degrees of freedom)\n",
        reg.observations, reg.degrees_of_freedom
    ));
}

fn render_attribution(out: &mut String, report: &AnalysisReport) {
    let attribution = &report.attribution;
    heading(out, "Attribution");
    out.push_str(&format!(
        "  {:<8} {:>12} {:>12}\n",
        "Source", "Monthly", "Annualized"
    ));
    for c in &attribution.contributions {
        out.push_str(&format!(
            "  {:<8} {:>12} {:>12}\n",
            c.component.label(),
            format_pct(c.monthly),
            format_pct(c.annualized)
        ));
    }
    out.push_str(&format!(
        "  {:<8} {:>12} {:>12}\n\n",
        "Total",
        format_pct(attribution.total_monthly),
        format_pct(attribution.total_annualized)
    ));
    out.push_str(&format!(
        "  Alpha, compounded annual: {}\n",
        format_pct(attribution.alpha_annualized_compounded)
    ));
    for mean in &attribution.factor_means {
        out.push_str(&format!(
            "  Mean {} return:        {}\n",
            mean.factor.label(),
            format_pct(mean.mean)
        ));
    }
}

fn render_interpretation(out: &mut String, report: &AnalysisReport) {
    let i = &report.interpretation;
    let reg = &report.regression;
    heading(out, "Interpretation");

    if let Some(beta) = i.market_sensitivity {
        let reading = if beta > 1.0 {
            "more sensitive than the market"
        } else if beta < 1.0 {
            "less sensitive than the market"
        } else {
            "moves with the market"
        };
        out.push_str(&format!("  Market:  beta {:.2}, {}\n", beta, reading));
    }
    if let (Some(size), Some(beta)) = (i.size, reg.beta_smb()) {
        let reading = match size {
            SizeTilt::SmallCap => "small-cap tilt",
            SizeTilt::LargeCap => "large-cap tilt",
        };
        out.push_str(&format!(
            "  Size:    {} (SMB beta {:.2})\n",
            reading, beta.value
        ));
    }
    if let (Some(style), Some(beta)) = (i.style, reg.beta_hml()) {
        let reading = match style {
            StyleTilt::Value => "value tilt",
            StyleTilt::Growth => "growth tilt",
        };
        out.push_str(&format!(
            "  Style:   {} (HML beta {:.2})\n",
            reading, beta.value
        ));
    }
    let significance = if i.alpha_significant {
        "statistically significant"
    } else {
        "not statistically significant"
    };
    out.push_str(&format!(
        "  Alpha:   {} (t = {:.2})\n",
        significance, reg.alpha.t_stat
    ));
}

impl ReportPort for TextReportAdapter {
    fn render(&self, report: &AnalysisReport) -> Result<String, AttributionError> {
        let title = format!("{} Return Attribution", report.ticker);
        let mut out = format!("{}\n{}\n", title, "=".repeat(title.len()));
        render_data(&mut out, report);
        render_method(&mut out, report);
        render_results(&mut out, report);
        render_attribution(&mut out, report);
        render_interpretation(&mut out, report);
        Ok(out)
    }
}
