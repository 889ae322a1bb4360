//! Analysis pipeline: prices → returns → aligned sample → attribution.
//!
//! AnalysisConfig carries the run parameters that select the asset, the
//! sample window and the factor table.

use super::alignment::{self, AlignedObservation};
use super::attribution::{self, AttributionBreakdown, RegressionResult};
use super::error::AttributionError;
use super::factor::{FactorModel, FactorRow};
use super::interpretation::Interpretation;
use super::price::PricePoint;
use super::returns;
use crate::ports::factor_port::FactorPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    /// `None` runs up to the latest available price.
    pub end_date: Option<NaiveDate>,
    pub factor_source: String,
    pub factor_model: FactorModel,
}

/// Core output of one run, before any presentation concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub aligned: Vec<AlignedObservation>,
    pub regression: RegressionResult,
    pub attribution: AttributionBreakdown,
}

/// Everything a report needs, as typed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub factor_source: String,
    pub requested_start: NaiveDate,
    pub requested_end: Option<NaiveDate>,
    /// First and last month of the fitted sample.
    pub sample_start: NaiveDate,
    pub sample_end: NaiveDate,
    pub regression: RegressionResult,
    pub attribution: AttributionBreakdown,
    pub interpretation: Interpretation,
}

/// Run the three core stages over in-memory inputs.
pub fn analyze(
    prices: &[PricePoint],
    factors: &[FactorRow],
    model: FactorModel,
) -> Result<Analysis, AttributionError> {
    let returns = returns::build(prices)?;
    let aligned = alignment::align(&returns, factors, model)?;
    let (regression, attribution) = attribution::fit(&aligned, model)?;
    Ok(Analysis {
        aligned,
        regression,
        attribution,
    })
}

pub fn run_analysis(
    price_port: &dyn PricePort,
    factor_port: &dyn FactorPort,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AttributionError> {
    tracing::info!(
        ticker = %config.ticker,
        start = %config.start_date,
        end = ?config.end_date,
        "fetching prices"
    );
    let prices = price_port.fetch_prices(&config.ticker, config.start_date, config.end_date)?;

    tracing::info!(source = %config.factor_source, "loading factors");
    let factors = factor_port.fetch_factors(&config.factor_source)?;

    let analysis = analyze(&prices, &factors, config.factor_model)?;

    let sample_start = analysis
        .aligned
        .first()
        .map(|o| o.period_end_date)
        .unwrap_or(config.start_date);
    let sample_end = analysis
        .aligned
        .last()
        .map(|o| o.period_end_date)
        .unwrap_or(config.start_date);

    let interpretation = Interpretation::from_regression(&analysis.regression);

    Ok(AnalysisReport {
        ticker: config.ticker.clone(),
        factor_source: config.factor_source.clone(),
        requested_start: config.start_date,
        requested_end: config.end_date,
        sample_start,
        sample_end,
        regression: analysis.regression,
        attribution: analysis.attribution,
        interpretation,
    })
}

/// A fixed three-factor report for presentation tests.
#[cfg(test)]
pub(crate) fn sample_report() -> AnalysisReport {
    use super::attribution::{Component, Contribution, FactorMean, Loading};
    use super::factor::Factor;
    use super::regression::Estimate;

    let est = |value: f64, std_error: f64| Estimate {
        value,
        std_error,
        t_stat: value / std_error,
    };
    let regression = RegressionResult {
        model: FactorModel::FamaFrench3,
        alpha: est(0.001, 0.0004),
        loadings: vec![
            Loading { factor: Factor::Market, beta: est(1.15, 0.05) },
            Loading { factor: Factor::Smb, beta: est(-0.2, 0.08) },
            Loading { factor: Factor::Hml, beta: est(-0.35, 0.1) },
        ],
        r_squared: 0.82,
        adjusted_r_squared: 0.815,
        residual_std_error: 0.031,
        observations: 120,
        degrees_of_freedom: 116,
    };
    let contribution = |component, monthly: f64| Contribution {
        component,
        monthly,
        annualized: monthly * 12.0,
    };
    let contributions = vec![
        contribution(Component::Market, 1.15 * 0.007),
        contribution(Component::Smb, -0.2 * 0.001),
        contribution(Component::Hml, -0.35 * 0.002),
        contribution(Component::Alpha, 0.001),
    ];
    let total_monthly: f64 = contributions.iter().map(|c| c.monthly).sum();
    let attribution = AttributionBreakdown {
        contributions,
        factor_means: vec![
            FactorMean { factor: Factor::Market, mean: 0.007 },
            FactorMean { factor: Factor::Smb, mean: 0.001 },
            FactorMean { factor: Factor::Hml, mean: 0.002 },
        ],
        alpha_annualized_compounded: attribution::compound_annualize(0.001),
        total_monthly,
        total_annualized: total_monthly * 12.0,
    };
    let interpretation = Interpretation::from_regression(&regression);

    AnalysisReport {
        ticker: "AAPL".to_string(),
        factor_source: "F-F_Research_Data_Factors.csv".to_string(),
        requested_start: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
        requested_end: None,
        sample_start: NaiveDate::from_ymd_opt(2014, 2, 28).unwrap(),
        sample_end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        regression,
        attribution,
        interpretation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn analyze_capm_scenario() {
        let prices = vec![
            PricePoint::new(d(2024, 1, 31), 100.0),
            PricePoint::new(d(2024, 2, 29), 110.0),
            PricePoint::new(d(2024, 3, 28), 99.0),
            PricePoint::new(d(2024, 4, 30), 108.9),
        ];
        let factors = vec![
            FactorRow::new(d(2024, 2, 1), 0.05, 0.0, 0.0, 0.0),
            FactorRow::new(d(2024, 3, 1), -0.05, 0.0, 0.0, 0.0),
            FactorRow::new(d(2024, 4, 1), 0.05, 0.0, 0.0, 0.0),
        ];

        let analysis = analyze(&prices, &factors, FactorModel::Capm).unwrap();
        assert_eq!(analysis.aligned.len(), 3);
        assert_relative_eq!(
            analysis.regression.beta_market().unwrap().value,
            2.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(analysis.regression.alpha.value, 0.0, epsilon = 1e-9);
        assert_relative_eq!(analysis.regression.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn analyze_three_factor_scenario_is_singular() {
        let prices = vec![
            PricePoint::new(d(2024, 1, 31), 100.0),
            PricePoint::new(d(2024, 2, 29), 110.0),
            PricePoint::new(d(2024, 3, 28), 99.0),
            PricePoint::new(d(2024, 4, 30), 108.9),
            PricePoint::new(d(2024, 5, 31), 98.01),
            PricePoint::new(d(2024, 6, 28), 107.811),
        ];
        let factors: Vec<FactorRow> = (2..=6u32)
            .map(|m| {
                let mkt = if m % 2 == 0 { 0.05 } else { -0.05 };
                FactorRow::new(d(2024, m, 1), mkt, 0.0, 0.0, 0.0)
            })
            .collect();

        let err = analyze(&prices, &factors, FactorModel::FamaFrench3).unwrap_err();
        assert!(matches!(err, AttributionError::SingularDesignMatrix { .. }));
    }
}
