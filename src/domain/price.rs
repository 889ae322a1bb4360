//! Adjusted price observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adjusted_price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adjusted_price: f64) -> Self {
        Self {
            date,
            adjusted_price,
        }
    }

    /// A missing or NaN/infinite price; such points are dropped, never zero-filled.
    pub fn is_missing(&self) -> bool {
        !self.adjusted_price.is_finite()
    }
}
