#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};
use factor_attrib::domain::calendar::month_end;
use factor_attrib::domain::error::AttributionError;
use factor_attrib::domain::factor::FactorRow;
pub use factor_attrib::domain::price::PricePoint;
use factor_attrib::ports::factor_port::FactorPort;
use factor_attrib::ports::price_port::PricePort;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, ticker: &str, prices: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), prices);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, AttributionError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AttributionError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|prices| {
                prices
                    .iter()
                    .filter(|p| p.date >= start_date && end_date.is_none_or(|end| p.date <= end))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct MockFactorPort {
    pub rows: Vec<FactorRow>,
}

impl MockFactorPort {
    pub fn new(rows: Vec<FactorRow>) -> Self {
        Self { rows }
    }
}

impl FactorPort for MockFactorPort {
    fn fetch_factors(&self, _source: &str) -> Result<Vec<FactorRow>, AttributionError> {
        Ok(self.rows.clone())
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// `months` consecutive month ends starting at `(year, month)`.
pub fn month_ends(year: i32, month: u32, months: usize) -> Vec<NaiveDate> {
    let mut date = d(year, month, 1);
    let mut out = Vec::with_capacity(months);
    for _ in 0..months {
        out.push(month_end(date));
        date = month_end(date).succ_opt().unwrap();
    }
    out
}

/// Deterministic, non-collinear monthly factors (decimal units).
pub fn synthetic_factor(i: usize) -> (f64, f64, f64, f64) {
    let t = i as f64;
    let mkt = 0.04 * (t * 0.7).sin() + 0.006;
    let smb = 0.02 * (t * 1.3 + 0.4).cos();
    let hml = 0.015 * (t * 0.45 + 1.1).sin() - 0.001;
    let rf = 0.002;
    (mkt, smb, hml, rf)
}

/// A price path whose monthly excess return follows the given loadings over
/// the synthetic factors, plus factor rows covering the same months.
pub fn synthetic_market(
    months: usize,
    alpha: f64,
    betas: (f64, f64, f64),
) -> (Vec<PricePoint>, Vec<FactorRow>) {
    let dates = month_ends(2015, 1, months + 1);
    let mut prices = vec![PricePoint::new(dates[0], 100.0)];
    let mut factors = Vec::with_capacity(months);
    let mut price = 100.0;

    for (i, &date) in dates.iter().enumerate().skip(1) {
        let (mkt, smb, hml, rf) = synthetic_factor(i);
        let noise = 0.002 * (i as f64 * 2.9).sin();
        let excess = alpha + betas.0 * mkt + betas.1 * smb + betas.2 * hml + noise;
        price *= 1.0 + excess + rf;
        prices.push(PricePoint::new(date, price));
        // factor files stamp the first of the month
        factors.push(FactorRow::new(
            d(date.year(), date.month(), 1),
            mkt,
            smb,
            hml,
            rf,
        ));
    }
    (prices, factors)
}

pub fn factor_csv(rows: &[FactorRow]) -> String {
    let mut out = String::from("Synthetic factors\n\n,Mkt-RF,SMB,HML,RF\n");
    for r in rows {
        out.push_str(&format!(
            "{:04}{:02},{},{},{},{}\n",
            r.period_end_date.year(),
            r.period_end_date.month(),
            r.market_excess * 100.0,
            r.smb * 100.0,
            r.hml * 100.0,
            r.risk_free * 100.0
        ));
    }
    out.push_str("\n Annual Factors: January-December\n,Mkt-RF,SMB,HML,RF\n2016,1,2,3,4\n");
    out
}

pub fn price_csv(prices: &[PricePoint]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for p in prices {
        out.push_str(&format!(
            "{},{px},{px},{px},{px},{px},1000\n",
            p.date,
            px = p.adjusted_price
        ));
    }
    out
}
