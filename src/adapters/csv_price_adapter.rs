//! CSV file price adapter.
//!
//! Reads `<base_path>/<TICKER>.csv` as exported by common market-data
//! providers: a `Date` column plus an adjusted close column.

use crate::domain::error::AttributionError;
use crate::domain::price::PricePoint;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const DATE_COLUMNS: &[&str] = &["date"];
/// Preferred first; plain close is the fallback for pre-adjusted exports.
const PRICE_COLUMNS: &[&str] = &["adj close", "adj_close", "adjusted_close", "close"];
const MISSING_VALUES: &[&str] = &["", "null", "nan", "na", "n/a"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

fn data_error(reason: String) -> AttributionError {
    AttributionError::DataSource { reason }
}

/// Parse a price cell; provider gaps become NaN so the return builder drops them.
fn parse_price(raw: &str, line: u64) -> Result<f64, AttributionError> {
    let trimmed = raw.trim();
    if MISSING_VALUES.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return Ok(f64::NAN);
    }
    trimmed
        .parse()
        .map_err(|e| data_error(format!("invalid price `{}` on line {}: {}", trimmed, line, e)))
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, AttributionError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error: {}", e)))?
            .clone();

        let date_idx = find_column(&headers, DATE_COLUMNS)
            .ok_or_else(|| data_error(format!("missing date column in {}", path.display())))?;
        let price_idx = find_column(&headers, PRICE_COLUMNS).ok_or_else(|| {
            data_error(format!("missing adjusted close column in {}", path.display()))
        })?;

        let mut prices = Vec::new();
        let mut missing = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record
                .get(date_idx)
                .ok_or_else(|| data_error(format!("missing date on line {}", line)))?;
            // Some exports carry a time component: keep the calendar date.
            let date_part = date_str.trim().get(..10).unwrap_or(date_str.trim());
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| data_error(format!("invalid date format on line {}: {}", line, e)))?;

            if date < start_date || end_date.is_some_and(|end| date > end) {
                continue;
            }

            let price = parse_price(record.get(price_idx).unwrap_or(""), line)?;
            if price.is_nan() {
                missing += 1;
            }
            prices.push(PricePoint::new(date, price));
        }

        if missing > 0 {
            tracing::warn!(ticker, missing, "price file has missing values");
        }

        prices.sort_by_key(|p| p.date);
        tracing::debug!(ticker, rows = prices.len(), path = %path.display(), "loaded prices");
        Ok(prices)
    }
}
