//! Kalman filter core: initiate, predict, project, update and gating over
//! bounding-box states.
//!
//! # Design choices
//! - Constant-velocity motion model with a fixed one-frame time step; the
//!   motion and observation matrices are built once at construction.
//! - The filter is **stateless**: every operation is a pure function of the
//!   caller's `(mean, covariance)` pair plus the constant matrices. Callers
//!   own per-track state and lifecycle.
//! - All math is done in `f64` via `nalgebra` fixed-size matrices.
//! - The Kalman gain and Mahalanobis distances use Cholesky-based solves,
//!   never explicit inversion; the projected covariance can be near-singular.
//! - Measurement noise is confidence-adaptive (NSA): the preset stds are
//!   scaled by `1 − confidence`, so a confident detection is fused as nearly
//!   exact and a weak one as noisy. `confidence = 0` is the non-adaptive
//!   baseline.
//!
//! ## State vector
//! x = [p0, p1, p2, p3, v0, v1, v2, v3]ᵀ — box components then their
//! per-frame velocities. The component meaning (aspect vs. width) is fixed by
//! the [`NoiseModel`] variant.

use crate::error::EstimatorError;
use crate::gating::{squared_gaussian, squared_mahalanobis, Metric};
use crate::noise::{NoiseModel, XyahNoise, XywhNoise};
use crate::types::{MeasCov, MeasVec, MotionMat, ObservationMat, StateCov, StateVec, NDIM};
use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;

/// Frame-to-frame time step. Detections arrive once per frame.
const DT: f64 = 1.0;

/// Filter over the `(x, y, aspect, h)` state layout.
pub type XyahKalmanFilter = KalmanFilter<XyahNoise>;

/// Filter over the `(x, y, w, h)` state layout.
pub type XywhKalmanFilter = KalmanFilter<XywhNoise>;

/// A constant-velocity Kalman filter for bounding-box tracking.
///
/// Generic over the [`NoiseModel`] supplying the variant-specific noise
/// scalings; everything else (matrices, prediction, fusion, gating) is
/// shared between variants.
#[derive(Clone, Debug)]
pub struct KalmanFilter<M> {
    motion_mat: MotionMat,
    observation_mat: ObservationMat,
    model: M,
}

impl KalmanFilter<XyahNoise> {
    /// Filter tracking `(x-center, y-center, aspect-ratio, height)` with
    /// default noise weights.
    pub fn xyah() -> Self {
        Self::new(XyahNoise::default())
    }
}

impl KalmanFilter<XywhNoise> {
    /// Filter tracking `(x-center, y-center, width, height)` with default
    /// noise weights.
    pub fn xywh() -> Self {
        Self::new(XywhNoise::default())
    }
}

impl<M: NoiseModel> KalmanFilter<M> {
    /// Build the constant motion/observation matrices around a noise model.
    pub fn new(model: M) -> Self {
        // F = I₈ with dt on the position→velocity couplings
        let mut motion_mat = MotionMat::identity();
        for i in 0..NDIM {
            motion_mat[(i, NDIM + i)] = DT;
        }
        // H = [I₄ 0₄]: extract the position block
        let mut observation_mat = ObservationMat::zeros();
        for i in 0..NDIM {
            observation_mat[(i, i)] = 1.0;
        }
        Self {
            motion_mat,
            observation_mat,
            model,
        }
    }

    /// Create a track state from an unassociated measurement.
    ///
    /// The position block is copied from the measurement, velocities start at
    /// zero, and the covariance is diagonal with the model's initial stds
    /// squared.
    pub fn initiate(&self, measurement: &MeasVec) -> (StateVec, StateCov) {
        let mut mean = StateVec::zeros();
        mean.fixed_rows_mut::<NDIM>(0).copy_from(measurement);

        let std = self.model.initial_std(measurement);
        let covariance = StateCov::from_diagonal(&std.component_mul(&std));
        (mean, covariance)
    }

    /// Prediction step: x' = F·x, P' = F·P·Fᵀ + Q.
    ///
    /// Q is diagonal with the model's process stds squared, evaluated on the
    /// pre-prediction mean.
    pub fn predict(&self, mean: &StateVec, covariance: &StateCov) -> (StateVec, StateCov) {
        let std = self.model.process_std(mean);
        let motion_cov = StateCov::from_diagonal(&std.component_mul(&std));

        let mean = self.motion_mat * mean;
        let covariance =
            self.motion_mat * covariance * self.motion_mat.transpose() + motion_cov;
        (mean, covariance)
    }

    /// Vectorized prediction over a batch of independent tracks.
    ///
    /// Rows share the motion matrix but each gets its own process-noise
    /// diagonal from its own mean. Output row `k` is exactly
    /// `predict(&states[k].0, &states[k].1)`.
    pub fn multi_predict(&self, states: &[(StateVec, StateCov)]) -> Vec<(StateVec, StateCov)>
    where
        M: Sync,
    {
        states
            .par_iter()
            .map(|(mean, covariance)| self.predict(mean, covariance))
            .collect()
    }

    /// Project a state distribution into measurement space:
    /// z = H·x, S = H·P·Hᵀ + R.
    ///
    /// R is diagonal with entries `((1 − confidence)·σᵢ)²` where σᵢ are the
    /// model's measurement stds. `confidence = 1` yields R = 0 (the
    /// measurement is fused as exact); `confidence = 0` keeps the full preset
    /// noise.
    pub fn project(
        &self,
        mean: &StateVec,
        covariance: &StateCov,
        confidence: f64,
    ) -> (MeasVec, MeasCov) {
        let std = self.model.measurement_std(mean) * (1.0 - confidence);
        let innovation_cov = MeasCov::from_diagonal(&std.component_mul(&std));

        let projected_mean = self.observation_mat * mean;
        let projected_cov =
            self.observation_mat * covariance * self.observation_mat.transpose()
                + innovation_cov;
        (projected_mean, projected_cov)
    }

    /// Correction step: fuse a measurement into the state.
    ///
    /// The gain K = P·Hᵀ·S⁻¹ is obtained by factorizing S = L·Lᵀ and solving
    /// S·Kᵀ = H·P, so S is never inverted explicitly. The output covariance
    /// is symmetrized to keep the PSD invariant under floating-point drift.
    ///
    /// Fails with [`EstimatorError::NotPositiveDefinite`] when the projected
    /// covariance cannot be factorized; no regularization is attempted.
    pub fn update(
        &self,
        mean: &StateVec,
        covariance: &StateCov,
        measurement: &MeasVec,
        confidence: f64,
    ) -> Result<(StateVec, StateCov), EstimatorError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance, confidence);

        let chol = projected_cov
            .cholesky()
            .ok_or(EstimatorError::NotPositiveDefinite)?;

        // Kᵀ = S⁻¹·(P·Hᵀ)ᵀ, one SPD solve against the factorization
        let pht = covariance * self.observation_mat.transpose();
        let gain = chol.solve(&pht.transpose()).transpose();

        let innovation = measurement - projected_mean;
        let new_mean = mean + gain * innovation;
        let new_cov = covariance - gain * projected_cov * gain.transpose();
        Ok((new_mean, symmetrize(&new_cov)))
    }

    /// Batched correction: applies [`Self::update`] to each row
    /// independently, with no cross-row interaction.
    ///
    /// Fails fast with [`EstimatorError::BatchLengthMismatch`] when the
    /// measurement or confidence slice length differs from the state slice.
    pub fn multi_update(
        &self,
        states: &[(StateVec, StateCov)],
        measurements: &[MeasVec],
        confidences: &[f64],
    ) -> Result<Vec<(StateVec, StateCov)>, EstimatorError>
    where
        M: Sync,
    {
        if measurements.len() != states.len() {
            return Err(EstimatorError::BatchLengthMismatch {
                expected: states.len(),
                got: measurements.len(),
            });
        }
        if confidences.len() != states.len() {
            return Err(EstimatorError::BatchLengthMismatch {
                expected: states.len(),
                got: confidences.len(),
            });
        }

        states
            .par_iter()
            .zip(measurements.par_iter())
            .zip(confidences.par_iter())
            .map(|(((mean, covariance), measurement), &confidence)| {
                self.update(mean, covariance, measurement, confidence)
            })
            .collect()
    }

    /// Gating distances between a state distribution and candidate
    /// measurements.
    ///
    /// The state is projected once (non-adaptive noise), then one distance is
    /// computed per measurement row. With `only_position` the size/aspect
    /// components are dropped and only the leading 2×2 covariance block is
    /// used. Suitable thresholds come from [`crate::gating::CHI2INV95`] at 2
    /// or 4 degrees of freedom.
    ///
    /// `metric` must be `"maha"` (squared Mahalanobis, Cholesky-based) or
    /// `"gaussian"` (squared Euclidean). Any other name fails with
    /// [`EstimatorError::InvalidMetric`] before any row is computed.
    pub fn gating_distance(
        &self,
        mean: &StateVec,
        covariance: &StateCov,
        measurements: &[MeasVec],
        only_position: bool,
        metric: &str,
    ) -> Result<Vec<f64>, EstimatorError> {
        let metric: Metric = metric.parse()?;
        let (projected_mean, projected_cov) = self.project(mean, covariance, 0.0);

        if only_position {
            let center: Vector2<f64> = projected_mean.xy();
            let center_cov: Matrix2<f64> = projected_cov.fixed_view::<2, 2>(0, 0).into_owned();
            let diffs: Vec<Vector2<f64>> =
                measurements.iter().map(|z| z.xy() - center).collect();
            match metric {
                Metric::Gaussian => Ok(squared_gaussian(&diffs)),
                Metric::Maha => squared_mahalanobis(center_cov, &diffs),
            }
        } else {
            let diffs: Vec<MeasVec> =
                measurements.iter().map(|z| z - projected_mean).collect();
            match metric {
                Metric::Gaussian => Ok(squared_gaussian(&diffs)),
                Metric::Maha => squared_mahalanobis(projected_cov, &diffs),
            }
        }
    }
}

/// Clamp a covariance back onto the symmetric manifold.
fn symmetrize(covariance: &StateCov) -> StateCov {
    (covariance + covariance.transpose()) * 0.5
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn initiate_copies_position_and_zeroes_velocity() {
        let kf = KalmanFilter::xywh();
        let (mean, cov) = kf.initiate(&MeasVec::new(100.0, 200.0, 40.0, 80.0));

        assert_abs_diff_eq!(mean[0], 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 200.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[2], 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[3], 80.0, epsilon = 1e-12);
        for i in 4..8 {
            assert_abs_diff_eq!(mean[i], 0.0, epsilon = 1e-12);
        }
        // diagonal, squared initial stds
        assert_abs_diff_eq!(cov[(0, 0)], (2.0 * 0.05 * 40.0f64).powi(2), epsilon = 1e-9);
        assert_abs_diff_eq!(cov[(0, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn predict_moves_position_by_velocity() {
        let kf = KalmanFilter::xywh();
        let (mut mean, cov) = kf.initiate(&MeasVec::new(0.0, 0.0, 10.0, 10.0));
        mean[4] = 3.0; // vx
        mean[5] = -2.0; // vy

        let (pred, pred_cov) = kf.predict(&mean, &cov);
        assert_abs_diff_eq!(pred[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pred[1], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pred[4], 3.0, epsilon = 1e-12); // velocity unchanged

        // uncertainty grows during prediction
        assert!(pred_cov.trace() > cov.trace());
    }

    #[test]
    fn update_reduces_uncertainty() {
        let kf = KalmanFilter::xyah();
        let (mean, cov) = kf.initiate(&MeasVec::new(50.0, 50.0, 1.0, 100.0));
        let (mean, cov) = kf.predict(&mean, &cov);

        let z = MeasVec::new(52.0, 49.0, 1.0, 101.0);
        let (new_mean, new_cov) = kf.update(&mean, &cov, &z, 0.0).unwrap();

        assert!(new_cov.trace() < cov.trace());
        // posterior mean sits between prior and measurement
        assert!(new_mean[0] > mean[0] && new_mean[0] < z[0]);
    }

    #[test]
    fn update_output_covariance_is_symmetric() {
        let kf = KalmanFilter::xywh();
        let (mean, cov) = kf.initiate(&MeasVec::new(10.0, 20.0, 30.0, 40.0));
        let (mean, cov) = kf.predict(&mean, &cov);
        let (_, new_cov) = kf
            .update(&mean, &cov, &MeasVec::new(11.0, 21.0, 30.0, 40.0), 0.5)
            .unwrap();

        for i in 0..8 {
            for j in 0..8 {
                assert_abs_diff_eq!(new_cov[(i, j)], new_cov[(j, i)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn project_full_confidence_zeroes_innovation_noise() {
        let kf = KalmanFilter::xywh();
        let (mean, cov) = kf.initiate(&MeasVec::new(10.0, 20.0, 30.0, 40.0));

        let (_, s_full) = kf.project(&mean, &cov, 1.0);
        let (_, s_base) = kf.project(&mean, &cov, 0.0);

        // with confidence 1 the projected covariance is exactly H·P·Hᵀ
        let diff = s_base - s_full;
        let std = MeasVec::new(0.05 * 30.0, 0.05 * 40.0, 0.05 * 30.0, 0.05 * 40.0);
        for i in 0..4 {
            assert_abs_diff_eq!(diff[(i, i)], std[i] * std[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn gating_rejects_unknown_metric() {
        let kf = KalmanFilter::xyah();
        let (mean, cov) = kf.initiate(&MeasVec::new(0.0, 0.0, 1.0, 10.0));
        let err = kf
            .gating_distance(&mean, &cov, &[MeasVec::zeros()], false, "cosine")
            .unwrap_err();
        assert_eq!(err, EstimatorError::InvalidMetric("cosine".into()));
    }
}
