//! Fama–French factor file adapter.
//!
//! Reads the CSV distributed by the Kenneth French data library. The file
//! starts with free-text lines, has a `,Mkt-RF,SMB,HML,RF` header, monthly
//! rows keyed `YYYYMM`, then an annual section keyed `YYYY` and a copyright
//! footer. Only monthly rows are kept; values are percent.

use crate::domain::error::AttributionError;
use crate::domain::factor::{Factor, FactorDateConvention, FactorRow};
use crate::ports::factor_port::FactorPort;
use chrono::NaiveDate;
use std::fs;

const RISK_FREE_LABEL: &str = "RF";

/// Column positions of the four values within a record.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    market: usize,
    smb: usize,
    hml: usize,
    risk_free: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            market: 1,
            smb: 2,
            hml: 3,
            risk_free: 4,
        }
    }
}

impl Columns {
    fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let find = |label: &str| record.iter().position(|f| f.trim().eq_ignore_ascii_case(label));
        Some(Self {
            market: find(Factor::Market.label())?,
            smb: find(Factor::Smb.label())?,
            hml: find(Factor::Hml.label())?,
            risk_free: find(RISK_FREE_LABEL)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FactorFileAdapter {
    convention: FactorDateConvention,
}

impl FactorFileAdapter {
    pub fn new(convention: FactorDateConvention) -> Self {
        Self { convention }
    }

    /// Parse factor file content.
    pub fn parse(&self, content: &str) -> Result<Vec<FactorRow>, AttributionError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut columns = Columns::default();
        let mut rows = Vec::new();
        let mut coerced = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| AttributionError::DataSource {
                reason: format!("factor file parse error: {}", e),
            })?;

            if let Some(header) = Columns::from_header(&record) {
                columns = header;
                continue;
            }

            let Some(date) = record.get(0).and_then(parse_period) else {
                continue;
            };

            let mut value = |idx: usize| match record.get(idx).map(str::parse::<f64>) {
                Some(Ok(v)) => v,
                _ => {
                    coerced += 1;
                    f64::NAN
                }
            };
            let market = value(columns.market);
            let smb = value(columns.smb);
            let hml = value(columns.hml);
            let risk_free = value(columns.risk_free);

            rows.push(FactorRow::from_percent(
                date,
                self.convention,
                market,
                smb,
                hml,
                risk_free,
            ));
        }

        if coerced > 0 {
            tracing::warn!(coerced, "factor file has non-numeric values, treated as missing");
        }

        if rows.is_empty() {
            return Err(AttributionError::DataSource {
                reason: "factor file contains no monthly rows".into(),
            });
        }

        rows.sort_by_key(|r| r.period_end_date);
        Ok(rows)
    }
}

/// Monthly period keys: `YYYYMM`, `YYYY-MM` or `YYYY-MM-DD`. Annual `YYYY` keys
/// and any other text yield `None`.
fn parse_period(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let (year, month) = if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
        (s[..4].parse().ok()?, s[4..].parse().ok()?)
    } else if s.len() == 7 && s.as_bytes()[4] == b'-' {
        (s.get(..4)?.parse().ok()?, s.get(5..)?.parse().ok()?)
    } else if s.len() == 10 {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

impl FactorPort for FactorFileAdapter {
    fn fetch_factors(&self, source: &str) -> Result<Vec<FactorRow>, AttributionError> {
        let content = fs::read_to_string(source).map_err(|e| AttributionError::DataSource {
            reason: format!("failed to read factor file {}: {}", source, e),
        })?;
        let rows = self.parse(&content)?;
        tracing::debug!(source, rows = rows.len(), "loaded factor rows");
        Ok(rows)
    }
}
