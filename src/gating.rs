//! Gating: statistical distances between a projected state and candidate
//! measurements, and the chi-square thresholds used to interpret them.
//!
//! # Gating criterion
//! d²(z, track) = νᵀ S⁻¹ ν  where ν = z − H·x̂,  S = H·P·Hᵀ + R
//!
//! The caller accepts a match if d² < χ²(0.95, dof). The estimator computes
//! distances only; thresholding is the caller's responsibility.

use crate::error::EstimatorError;
use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 0.95 quantile of the chi-square distribution, indexed by degrees of
/// freedom 1..=9. Index 0 is unused.
///
/// Used as a gating threshold on Mahalanobis distances: a measurement with
/// `d² > CHI2INV95[dof]` is an implausible match at the 95% level.
pub const CHI2INV95: [f64; 10] = [
    0.0, 3.8415, 5.9915, 7.8147, 9.4877, 11.070, 12.592, 14.067, 15.507, 16.919,
];

/// Distance metric for [`crate::kf::KalmanFilter::gating_distance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Squared Euclidean distance between measurement and projected mean.
    Gaussian,
    /// Squared Mahalanobis distance under the projected covariance.
    /// Numerically preferred and the usual default.
    Maha,
}

impl FromStr for Metric {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(Metric::Gaussian),
            "maha" => Ok(Metric::Maha),
            other => Err(EstimatorError::InvalidMetric(other.to_owned())),
        }
    }
}

/// Squared Euclidean distance per innovation row.
pub(crate) fn squared_gaussian<const D: usize>(diffs: &[SVector<f64, D>]) -> Vec<f64> {
    diffs.iter().map(|d| d.norm_squared()).collect()
}

/// Squared Mahalanobis distance per innovation row.
///
/// Factorizes `cov = L·Lᵀ` once, then solves `L·z = d` per row by forward
/// substitution; `‖z‖² = dᵀ·cov⁻¹·d`. No explicit inversion.
pub(crate) fn squared_mahalanobis<const D: usize>(
    cov: SMatrix<f64, D, D>,
    diffs: &[SVector<f64, D>],
) -> Result<Vec<f64>, EstimatorError> {
    let chol = cov.cholesky().ok_or(EstimatorError::NotPositiveDefinite)?;
    let l = chol.l();
    let mut distances = Vec::with_capacity(diffs.len());
    for d in diffs {
        let z = l
            .solve_lower_triangular(d)
            .ok_or(EstimatorError::NotPositiveDefinite)?;
        distances.push(z.norm_squared());
    }
    Ok(distances)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
