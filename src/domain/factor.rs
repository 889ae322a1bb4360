//! Risk factors, factor rows and the configured factor model.

use super::calendar::month_end;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A systematic risk factor of the Fama–French family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    /// Market return minus the risk-free rate.
    Market,
    /// Small-minus-big size spread.
    Smb,
    /// High-minus-low value spread.
    Hml,
}

impl Factor {
    pub fn name(&self) -> &'static str {
        match self {
            Factor::Market => "market",
            Factor::Smb => "smb",
            Factor::Hml => "hml",
        }
    }

    /// Column label used in the published factor files.
    pub fn label(&self) -> &'static str {
        match self {
            Factor::Market => "Mkt-RF",
            Factor::Smb => "SMB",
            Factor::Hml => "HML",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The configured factor set regressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FactorModel {
    /// Market, size and value factors.
    #[default]
    #[serde(rename = "ff3")]
    FamaFrench3,
    /// Market factor only.
    #[serde(rename = "capm")]
    Capm,
}

impl FactorModel {
    pub fn factors(&self) -> &'static [Factor] {
        match self {
            FactorModel::FamaFrench3 => &[Factor::Market, Factor::Smb, Factor::Hml],
            FactorModel::Capm => &[Factor::Market],
        }
    }

    /// Intercept plus one coefficient per factor.
    pub fn parameters(&self) -> usize {
        self.factors().len() + 1
    }

    /// Smallest sample that leaves one residual degree of freedom.
    pub fn min_observations(&self) -> usize {
        self.parameters() + 1
    }
}

impl fmt::Display for FactorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorModel::FamaFrench3 => f.write_str("ff3"),
            FactorModel::Capm => f.write_str("capm"),
        }
    }
}

impl FromStr for FactorModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ff3" | "fama_french_3" | "fama-french-3" => Ok(FactorModel::FamaFrench3),
            "capm" => Ok(FactorModel::Capm),
            other => Err(format!("unknown factor model `{other}` (expected ff3 or capm)")),
        }
    }
}

/// How a factor file stamps the month a row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactorDateConvention {
    /// The date falls inside the month it describes (e.g. `YYYYMM` parsed as day 1).
    #[default]
    PeriodMonth,
    /// The row is stamped on the first day of the following month.
    NextMonthStart,
}

impl FactorDateConvention {
    /// Month end of the period the stamped date refers to.
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            FactorDateConvention::PeriodMonth => month_end(date),
            FactorDateConvention::NextMonthStart if date.day() == 1 => {
                date.pred_opt().map(month_end).unwrap_or_else(|| month_end(date))
            }
            FactorDateConvention::NextMonthStart => month_end(date),
        }
    }
}

impl FromStr for FactorDateConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "period_month" => Ok(FactorDateConvention::PeriodMonth),
            "next_month_start" => Ok(FactorDateConvention::NextMonthStart),
            other => Err(format!(
                "unknown date convention `{other}` (expected period_month or next_month_start)"
            )),
        }
    }
}

/// One month of factor returns, in decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    /// Calendar month end.
    pub period_end_date: NaiveDate,
    pub market_excess: f64,
    pub smb: f64,
    pub hml: f64,
    pub risk_free: f64,
}

impl FactorRow {
    /// Row from decimal values; the date is normalized to its month end.
    pub fn new(date: NaiveDate, market_excess: f64, smb: f64, hml: f64, risk_free: f64) -> Self {
        Self {
            period_end_date: month_end(date),
            market_excess,
            smb,
            hml,
            risk_free,
        }
    }

    /// Row from the percent values published in factor files.
    pub fn from_percent(
        date: NaiveDate,
        convention: FactorDateConvention,
        market_excess_pct: f64,
        smb_pct: f64,
        hml_pct: f64,
        risk_free_pct: f64,
    ) -> Self {
        Self {
            period_end_date: convention.period_end(date),
            market_excess: market_excess_pct / 100.0,
            smb: smb_pct / 100.0,
            hml: hml_pct / 100.0,
            risk_free: risk_free_pct / 100.0,
        }
    }
}
