//! Error type for the estimator.
//!
//! The taxonomy is deliberately narrow: the estimator assumes well-formed
//! inputs and only reports conditions the caller can act on.

use thiserror::Error;

/// Errors surfaced by the state estimator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// Unknown gating metric name. Supported: `maha`, `gaussian`.
    #[error("unsupported gating metric `{0}` (expected `maha` or `gaussian`)")]
    InvalidMetric(String),

    /// Cholesky factorization of a projected covariance failed.
    ///
    /// The projected covariance must be positive definite for the Kalman gain
    /// and Mahalanobis solves. The estimator does not regularize on failure;
    /// the caller owns track lifecycle and decides whether to drop or re-seed
    /// the offending track.
    #[error("projected covariance is not positive definite")]
    NotPositiveDefinite,

    /// Batched operation called with slices of unequal length.
    #[error("batch length mismatch: {expected} state rows, {got} rows supplied")]
    BatchLengthMismatch { expected: usize, got: usize },
}
