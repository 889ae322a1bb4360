//! Month-end simple return series.
//!
//! Daily prices are resampled to one price per calendar month (the last
//! trading day's price) and turned into period-over-period simple returns.
//! Months without any price are absent; a return is only produced between
//! calendar-consecutive months.

use super::calendar::{month_key, previous_month, MonthKey};
use super::error::AttributionError;
use super::price::PricePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    /// Last trading date of the month.
    pub period_end_date: NaiveDate,
    pub simple_return: f64,
}

/// One price per calendar month, keyed by month, last observation wins.
pub fn month_end_prices(prices: &[PricePoint]) -> Result<Vec<PricePoint>, AttributionError> {
    let mut by_month: BTreeMap<MonthKey, PricePoint> = BTreeMap::new();
    let mut missing = 0usize;

    for point in prices {
        if point.is_missing() {
            missing += 1;
            continue;
        }
        let slot = by_month.entry(month_key(point.date)).or_insert(*point);
        if point.date >= slot.date {
            *slot = *point;
        }
    }

    if missing > 0 {
        tracing::debug!(missing, "dropped missing prices");
    }

    // only the retained month-end price must be positive
    if let Some(bad) = by_month.values().find(|p| p.adjusted_price <= 0.0) {
        return Err(AttributionError::NonPositivePrice {
            date: bad.date,
            price: bad.adjusted_price,
        });
    }

    Ok(by_month.into_values().collect())
}

/// Build the month-end simple return series from raw prices.
pub fn build(prices: &[PricePoint]) -> Result<Vec<ReturnObservation>, AttributionError> {
    let monthly = month_end_prices(prices)?;
    if monthly.len() < 2 {
        return Err(AttributionError::EmptySeries {
            monthly_points: monthly.len(),
        });
    }

    let mut returns = Vec::with_capacity(monthly.len() - 1);
    let mut gaps = 0usize;

    for w in monthly.windows(2) {
        let (prev, curr) = (&w[0], &w[1]);
        if previous_month(month_key(curr.date)) != month_key(prev.date) {
            gaps += 1;
            continue;
        }
        returns.push(ReturnObservation {
            period_end_date: curr.date,
            simple_return: curr.adjusted_price / prev.adjusted_price - 1.0,
        });
    }

    if gaps > 0 {
        tracing::debug!(gaps, "dropped returns following months without prices");
    }

    if returns.is_empty() {
        return Err(AttributionError::EmptySeries {
            monthly_points: monthly.len(),
        });
    }

    tracing::debug!(
        months = monthly.len(),
        returns = returns.len(),
        "built monthly return series"
    );
    Ok(returns)
}
