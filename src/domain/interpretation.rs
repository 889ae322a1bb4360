//! Qualitative reading of the fitted loadings.

use super::attribution::RegressionResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTilt {
    /// Positive HML loading.
    Value,
    /// Negative HML loading.
    Growth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTilt {
    /// Positive SMB loading.
    SmallCap,
    /// Negative SMB loading.
    LargeCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// `None` when the model has no HML factor.
    pub style: Option<StyleTilt>,
    /// `None` when the model has no SMB factor.
    pub size: Option<SizeTilt>,
    pub market_sensitivity: Option<f64>,
    pub alpha_significant: bool,
}

impl Interpretation {
    pub fn from_regression(regression: &RegressionResult) -> Self {
        // A zero loading reads as value / small-cap, matching `>= 0`.
        let style = regression.beta_hml().map(|b| {
            if b.value < 0.0 {
                StyleTilt::Growth
            } else {
                StyleTilt::Value
            }
        });
        let size = regression.beta_smb().map(|b| {
            if b.value < 0.0 {
                SizeTilt::LargeCap
            } else {
                SizeTilt::SmallCap
            }
        });

        Self {
            style,
            size,
            market_sensitivity: regression.beta_market().map(|b| b.value),
            alpha_significant: regression.alpha.is_significant(),
        }
    }
}
