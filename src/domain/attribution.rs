//! Factor-model fit and return attribution.
//!
//! Monthly contributions are `beta × mean(factor)` per factor and the
//! intercept for alpha; annualized contributions scale those by 12 so the
//! components add up to twelve times the mean fitted excess return. The
//! compounded alpha `(1 + alpha)^12 - 1` is kept apart as a headline figure
//! and does not take part in that sum.

use super::alignment::AlignedObservation;
use super::error::AttributionError;
use super::factor::{Factor, FactorModel};
use super::regression::{ols, Estimate};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PERIODS_PER_YEAR: f64 = 12.0;

/// A fitted factor loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loading {
    pub factor: Factor,
    pub beta: Estimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub model: FactorModel,
    /// Monthly intercept.
    pub alpha: Estimate,
    /// One loading per factor of `model`, in model order.
    pub loadings: Vec<Loading>,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub residual_std_error: f64,
    pub observations: usize,
    pub degrees_of_freedom: usize,
}

impl RegressionResult {
    pub fn beta(&self, factor: Factor) -> Option<Estimate> {
        self.loadings
            .iter()
            .find(|l| l.factor == factor)
            .map(|l| l.beta)
    }

    pub fn beta_market(&self) -> Option<Estimate> {
        self.beta(Factor::Market)
    }

    pub fn beta_smb(&self) -> Option<Estimate> {
        self.beta(Factor::Smb)
    }

    pub fn beta_hml(&self) -> Option<Estimate> {
        self.beta(Factor::Hml)
    }
}

/// A term of the additive attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Alpha,
    Market,
    Smb,
    Hml,
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Component::Alpha => "alpha",
            Component::Market => "market",
            Component::Smb => "smb",
            Component::Hml => "hml",
        }
    }

    /// Display label: the factor file's column name, or "Alpha".
    pub fn label(&self) -> &'static str {
        match self {
            Component::Alpha => "Alpha",
            Component::Market => Factor::Market.label(),
            Component::Smb => Factor::Smb.label(),
            Component::Hml => Factor::Hml.label(),
        }
    }
}

impl From<Factor> for Component {
    fn from(factor: Factor) -> Self {
        match factor {
            Factor::Market => Component::Market,
            Factor::Smb => Component::Smb,
            Factor::Hml => Component::Hml,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub component: Component,
    pub monthly: f64,
    /// `monthly × 12`, simple scaling.
    pub annualized: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorMean {
    pub factor: Factor,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionBreakdown {
    /// Market, smb, hml (those in the model) followed by alpha.
    pub contributions: Vec<Contribution>,
    pub factor_means: Vec<FactorMean>,
    /// `(1 + alpha)^12 - 1`, the headline alpha.
    pub alpha_annualized_compounded: f64,
    pub total_monthly: f64,
    pub total_annualized: f64,
}

impl AttributionBreakdown {
    pub fn get(&self, component: Component) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.component == component)
    }

    pub fn alpha(&self) -> Option<&Contribution> {
        self.get(Component::Alpha)
    }

    pub fn factor_mean(&self, factor: Factor) -> Option<f64> {
        self.factor_means
            .iter()
            .find(|m| m.factor == factor)
            .map(|m| m.mean)
    }
}

pub fn annualize(monthly: f64) -> f64 {
    monthly * PERIODS_PER_YEAR
}

pub fn compound_annualize(monthly: f64) -> f64 {
    (1.0 + monthly).powf(PERIODS_PER_YEAR) - 1.0
}

/// Fit the factor model on the aligned sample and attribute its return.
pub fn fit(
    aligned: &[AlignedObservation],
    model: FactorModel,
) -> Result<(RegressionResult, AttributionBreakdown), AttributionError> {
    let factors = model.factors();
    let n = aligned.len();
    let p = model.parameters();

    let x = DMatrix::from_fn(n, p, |i, j| {
        if j == 0 {
            1.0
        } else {
            aligned[i].value(factors[j - 1])
        }
    });
    let y = DVector::from_iterator(n, aligned.iter().map(|o| o.asset_excess_return));

    let mut columns = vec!["alpha"];
    columns.extend(factors.iter().map(|f| f.name()));

    let fit = ols(&x, &y, &columns)?;

    let alpha = fit.estimates[0];
    let loadings: Vec<Loading> = factors
        .iter()
        .zip(fit.estimates.iter().skip(1))
        .map(|(&factor, &beta)| Loading { factor, beta })
        .collect();

    let factor_means: Vec<FactorMean> = factors
        .iter()
        .map(|&factor| FactorMean {
            factor,
            mean: aligned.iter().map(|o| o.value(factor)).sum::<f64>() / n as f64,
        })
        .collect();

    let mut contributions: Vec<Contribution> = loadings
        .iter()
        .zip(factor_means.iter())
        .map(|(loading, mean)| {
            let monthly = loading.beta.value * mean.mean;
            Contribution {
                component: loading.factor.into(),
                monthly,
                annualized: annualize(monthly),
            }
        })
        .collect();
    contributions.push(Contribution {
        component: Component::Alpha,
        monthly: alpha.value,
        annualized: annualize(alpha.value),
    });

    let total_monthly: f64 = contributions.iter().map(|c| c.monthly).sum();

    tracing::info!(
        model = %model,
        observations = fit.observations,
        r_squared = fit.r_squared,
        alpha = alpha.value,
        "fitted factor model"
    );

    let regression = RegressionResult {
        model,
        alpha,
        loadings,
        r_squared: fit.r_squared,
        adjusted_r_squared: fit.adjusted_r_squared,
        residual_std_error: fit.residual_std_error,
        observations: fit.observations,
        degrees_of_freedom: fit.degrees_of_freedom,
    };
    let breakdown = AttributionBreakdown {
        contributions,
        factor_means,
        alpha_annualized_compounded: compound_annualize(alpha.value),
        total_monthly,
        total_annualized: annualize(total_monthly),
    };
    Ok((regression, breakdown))
}
