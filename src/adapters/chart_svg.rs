//! SVG bar chart of annualized return contributions.

use crate::domain::analysis::AnalysisReport;
use crate::domain::attribution::Contribution;
use crate::domain::error::AttributionError;
use crate::ports::report_port::ReportPort;

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 40.0;
const BAR_FILL: f64 = 0.6;

const POSITIVE_COLOR: &str = "#2e7d32";
const NEGATIVE_COLOR: &str = "#c62828";

#[derive(Debug, Default)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Value range of the plot, always spanning zero.
fn value_range(bars: &[Contribution]) -> (f64, f64) {
    let lo = bars.iter().map(|c| c.annualized).fold(0.0, f64::min);
    let hi = bars.iter().map(|c| c.annualized).fold(0.0, f64::max);
    if hi - lo > 0.0 { (lo, hi) } else { (lo - 0.01, hi + 0.01) }
}

pub fn generate_attribution_svg(ticker: &str, bars: &[Contribution]) -> String {
    let finite: Vec<Contribution> = bars
        .iter()
        .copied()
        .filter(|c| c.annualized.is_finite())
        .collect();
    let (min_value, max_value) = value_range(&finite);
    let range = max_value - min_value;

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let y_scale = |v: f64| -> f64 { MARGIN_TOP + (max_value - v) / range * plot_height };
    let zero_y = y_scale(0.0);
    let slot = plot_width / finite.len().max(1) as f64;
    let bar_width = slot * BAR_FILL;

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"22\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\">{} Return Attribution (Annualised)</text>\n",
        CHART_WIDTH / 2.0,
        escape_xml(ticker)
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    for value in [max_value, min_value] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.1}%</text>\n",
            MARGIN_LEFT - 5.0,
            y_scale(value) + 4.0,
            value * 100.0
        ));
    }

    for (i, c) in finite.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
        let top = y_scale(c.annualized.max(0.0));
        let height = (y_scale(c.annualized.min(0.0)) - top).max(0.0);
        let color = if c.annualized < 0.0 { NEGATIVE_COLOR } else { POSITIVE_COLOR };
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            x, top, bar_width, height, color
        ));
        let value_y = if c.annualized < 0.0 { top + height + 12.0 } else { top - 4.0 };
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{:+.2}%</text>\n",
            x + bar_width / 2.0,
            value_y,
            c.annualized * 100.0
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#333\">{}</text>\n",
            x + bar_width / 2.0,
            CHART_HEIGHT - MARGIN_BOTTOM / 2.0 + 4.0,
            c.component.label()
        ));
    }

    // zero axis, over the bars
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#333\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        zero_y,
        CHART_WIDTH - MARGIN_RIGHT,
        zero_y
    ));
    svg.push_str("</svg>\n");
    svg
}

impl ReportPort for SvgChartAdapter {
    fn render(&self, report: &AnalysisReport) -> Result<String, AttributionError> {
        Ok(generate_attribution_svg(
            &report.ticker,
            &report.attribution.contributions,
        ))
    }
}
