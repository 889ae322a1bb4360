//! Joins asset returns with factor rows on the calendar month.
//!
//! Both inputs are keyed by calendar month end before the inner join, so a
//! return dated on the last trading day (e.g. Friday the 29th) meets the
//! factor row of the same month. Rows with non-finite regression columns are
//! dropped after the join; nothing is imputed.

use super::calendar::month_end;
use super::error::{AttributionError, DateSpan};
use super::factor::{Factor, FactorModel, FactorRow};
use super::returns::ReturnObservation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedObservation {
    /// Calendar month end.
    pub period_end_date: NaiveDate,
    pub asset_excess_return: f64,
    pub market_excess: f64,
    pub smb: f64,
    pub hml: f64,
}

impl AlignedObservation {
    pub fn value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Market => self.market_excess,
            Factor::Smb => self.smb,
            Factor::Hml => self.hml,
        }
    }

    fn is_complete(&self, model: FactorModel) -> bool {
        self.asset_excess_return.is_finite()
            && model.factors().iter().all(|&f| self.value(f).is_finite())
    }
}

fn index_by_month<T: Copy>(
    rows: &[T],
    date_of: impl Fn(&T) -> NaiveDate,
    what: &str,
) -> BTreeMap<NaiveDate, T> {
    let mut map = BTreeMap::new();
    for row in rows {
        let key = month_end(date_of(row));
        if map.insert(key, *row).is_some() {
            tracing::warn!(month = %key, "duplicate {} month, keeping the last row", what);
        }
    }
    map
}

/// Inner join on month end; only the columns of `model` must be finite.
pub fn align(
    returns: &[ReturnObservation],
    factors: &[FactorRow],
    model: FactorModel,
) -> Result<Vec<AlignedObservation>, AttributionError> {
    let returns_by_month = index_by_month(returns, |r| r.period_end_date, "return");
    let factors_by_month = index_by_month(factors, |f| f.period_end_date, "factor");

    let joined: Vec<AlignedObservation> = returns_by_month
        .iter()
        .filter_map(|(month, ret)| {
            factors_by_month.get(month).map(|f| AlignedObservation {
                period_end_date: *month,
                asset_excess_return: ret.simple_return - f.risk_free,
                market_excess: f.market_excess,
                smb: f.smb,
                hml: f.hml,
            })
        })
        .collect();

    if joined.is_empty() {
        return Err(AttributionError::NoOverlap {
            returns: returns.len(),
            returns_span: DateSpan::of(returns_by_month.keys().copied()),
            factors: factors.len(),
            factors_span: DateSpan::of(factors_by_month.keys().copied()),
        });
    }

    let joined_len = joined.len();
    let cleaned: Vec<AlignedObservation> = joined
        .into_iter()
        .filter(|obs| obs.is_complete(model))
        .collect();
    let dropped = joined_len - cleaned.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped aligned rows with non-finite values");
    }

    let minimum = model.min_observations();
    if cleaned.len() < minimum {
        return Err(AttributionError::InsufficientObservations {
            observations: cleaned.len(),
            minimum,
            dropped,
            span: DateSpan::of(cleaned.iter().map(|o| o.period_end_date)),
        });
    }

    tracing::info!(
        observations = cleaned.len(),
        dropped,
        span = %DateSpan::of(cleaned.iter().map(|o| o.period_end_date)),
        "aligned returns with factors"
    );
    Ok(cleaned)
}
