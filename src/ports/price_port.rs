//! Price data port trait.

use crate::domain::error::AttributionError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait PricePort {
    /// Adjusted prices for `ticker` in `[start_date, end_date]`, oldest first.
    /// An absent `end_date` means up to the latest available price.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, AttributionError>;
}
