//! Factor data port trait.

use crate::domain::error::AttributionError;
use crate::domain::factor::FactorRow;

pub trait FactorPort {
    /// Monthly factor rows from `source`, already in decimal units.
    fn fetch_factors(&self, source: &str) -> Result<Vec<FactorRow>, AttributionError>;
}
