//! Ordinary least squares with classical standard errors.
//!
//! Solved through a Householder QR of the design matrix rather than the
//! normal equations, so `(XᵀX)⁻¹` is formed as `R⁻¹R⁻ᵀ`. Rank deficiency is
//! detected from the diagonal of `R` and reported, never papered over with a
//! pseudo-inverse.

use super::error::{AttributionError, DateSpan};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Relative threshold on `|R_jj|` below which a column counts as dependent.
pub const RANK_TOLERANCE: f64 = 1e-10;

/// A fitted coefficient with its standard error and t-statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub value: f64,
    pub std_error: f64,
    pub t_stat: f64,
}

impl Estimate {
    fn new(value: f64, std_error: f64) -> Self {
        Self {
            value,
            std_error,
            t_stat: t_statistic(value, std_error),
        }
    }

    /// `|t| >= 2`, the usual rule of thumb.
    pub fn is_significant(&self) -> bool {
        self.t_stat.abs() >= 2.0
    }
}

/// `value / std_error`; a zero standard error (perfect fit) gives ±∞, or 0
/// for an exactly-zero coefficient.
fn t_statistic(value: f64, std_error: f64) -> f64 {
    if std_error > 0.0 {
        value / std_error
    } else if value == 0.0 {
        0.0
    } else {
        value.signum() * f64::INFINITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// One estimate per design column, in column order.
    pub estimates: Vec<Estimate>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub residual_std_error: f64,
    pub observations: usize,
    pub degrees_of_freedom: usize,
}

/// Fit `y = X b + e`. `columns` names the design columns for diagnostics.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>, columns: &[&str]) -> Result<OlsFit, AttributionError> {
    let (n, p) = x.shape();
    debug_assert_eq!(columns.len(), p);
    debug_assert_eq!(y.len(), n);

    if n <= p {
        return Err(AttributionError::InsufficientObservations {
            observations: n,
            minimum: p + 1,
            dropped: 0,
            span: DateSpan(None),
        });
    }

    let qr = x.clone().qr();
    let r = qr.r();
    let q = qr.q();

    let max_diag = (0..p).map(|j| r[(j, j)].abs()).fold(0.0_f64, f64::max);
    let singular = |column: usize| AttributionError::SingularDesignMatrix {
        observations: n,
        parameters: p,
        column: columns.get(column).copied().unwrap_or("?").to_string(),
    };
    if let Some(j) = (0..p).find(|&j| !(r[(j, j)].abs() > RANK_TOLERANCE * max_diag)) {
        return Err(singular(j));
    }

    let qty = q.transpose() * y;
    let beta = r.solve_upper_triangular(&qty).ok_or_else(|| singular(p - 1))?;
    let r_inv = r.try_inverse().ok_or_else(|| singular(p - 1))?;
    let xtx_inv = &r_inv * r_inv.transpose();

    let fitted = x * &beta;
    let residuals = y - &fitted;

    let ss_res = residuals.norm_squared();
    let mean_y = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();

    let dof = n - p;
    let sigma2 = ss_res / dof as f64;

    let estimates: Vec<Estimate> = (0..p)
        .map(|j| Estimate::new(beta[j], (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt()))
        .collect();

    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / dof as f64;

    Ok(OlsFit {
        estimates,
        fitted: fitted.iter().copied().collect(),
        residuals: residuals.iter().copied().collect(),
        r_squared,
        adjusted_r_squared,
        residual_std_error: sigma2.sqrt(),
        observations: n,
        degrees_of_freedom: dof,
    })
}
