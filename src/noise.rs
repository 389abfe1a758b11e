//! Noise-scale models: how initial, process and measurement standard
//! deviations scale with the tracked box.
//!
//! The shared filter in [`crate::kf`] is generic over a [`NoiseModel`]; the
//! two concrete models differ only in which box dimension drives the scaling:
//!
//! - [`XyahNoise`]: state `(x, y, aspect, h)`, everything scales with height.
//!   The aspect-ratio slots use small fixed stds since aspect is unitless.
//! - [`XywhNoise`]: state `(x, y, w, h)`, x-like components scale with width,
//!   y-like components with height.

use crate::types::{MeasVec, StateVec};
use serde::{Deserialize, Serialize};

/// Relative noise-scale coefficients, fixed at construction.
///
/// Standard deviations are expressed as fractions of a box dimension:
/// a `position` weight of 1/20 on a 100 px tall box gives a 5 px position std.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseWeights {
    /// Weight applied to position-block standard deviations.
    pub position: f64,
    /// Weight applied to velocity-block standard deviations.
    pub velocity: f64,
}

impl Default for NoiseWeights {
    fn default() -> Self {
        Self {
            position: 1.0 / 20.0,
            velocity: 1.0 / 160.0,
        }
    }
}

/// Strategy supplying the variant-specific standard deviations.
///
/// Each hook returns standard deviations (not variances); the filter squares
/// them into diagonal covariances. There are no default bodies: a variant
/// must supply all three scalings to exist at all.
pub trait NoiseModel {
    /// Stds for the diagonal of a freshly initiated state covariance.
    fn initial_std(&self, measurement: &MeasVec) -> StateVec;

    /// Stds for the process-noise diagonal added during prediction,
    /// as a function of the current (pre-prediction) mean.
    fn process_std(&self, mean: &StateVec) -> StateVec;

    /// Stds for the measurement-noise diagonal used when projecting into
    /// measurement space.
    fn measurement_std(&self, mean: &StateVec) -> MeasVec;
}

// ---------------------------------------------------------------------------
// (x, y, aspect, h) model
// ---------------------------------------------------------------------------

/// Noise scaling for the `(x-center, y-center, aspect-ratio, height)` layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct XyahNoise {
    pub weights: NoiseWeights,
}

impl XyahNoise {
    pub fn new(weights: NoiseWeights) -> Self {
        Self { weights }
    }
}

impl NoiseModel for XyahNoise {
    fn initial_std(&self, measurement: &MeasVec) -> StateVec {
        let h = measurement[3];
        let wp = self.weights.position;
        let wv = self.weights.velocity;
        StateVec::from_column_slice(&[
            2.0 * wp * h,
            2.0 * wp * h,
            1e-2,
            2.0 * wp * h,
            10.0 * wv * h,
            10.0 * wv * h,
            1e-5,
            10.0 * wv * h,
        ])
    }

    fn process_std(&self, mean: &StateVec) -> StateVec {
        let h = mean[3];
        let wp = self.weights.position;
        let wv = self.weights.velocity;
        StateVec::from_column_slice(&[
            wp * h,
            wp * h,
            1e-2,
            wp * h,
            wv * h,
            wv * h,
            1e-5,
            wv * h,
        ])
    }

    fn measurement_std(&self, mean: &StateVec) -> MeasVec {
        let h = mean[3];
        let wp = self.weights.position;
        MeasVec::new(wp * h, wp * h, 1e-1, wp * h)
    }
}

// ---------------------------------------------------------------------------
// (x, y, w, h) model
// ---------------------------------------------------------------------------

/// Noise scaling for the `(x-center, y-center, width, height)` layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct XywhNoise {
    pub weights: NoiseWeights,
}

impl XywhNoise {
    pub fn new(weights: NoiseWeights) -> Self {
        Self { weights }
    }
}

impl NoiseModel for XywhNoise {
    fn initial_std(&self, measurement: &MeasVec) -> StateVec {
        let (w, h) = (measurement[2], measurement[3]);
        let wp = self.weights.position;
        let wv = self.weights.velocity;
        StateVec::from_column_slice(&[
            2.0 * wp * w,
            2.0 * wp * h,
            2.0 * wp * w,
            2.0 * wp * h,
            10.0 * wv * w,
            10.0 * wv * h,
            10.0 * wv * w,
            10.0 * wv * h,
        ])
    }

    fn process_std(&self, mean: &StateVec) -> StateVec {
        let (w, h) = (mean[2], mean[3]);
        let wp = self.weights.position;
        let wv = self.weights.velocity;
        StateVec::from_column_slice(&[
            wp * w,
            wp * h,
            wp * w,
            wp * h,
            wv * w,
            wv * h,
            wv * w,
            wv * h,
        ])
    }

    fn measurement_std(&self, mean: &StateVec) -> MeasVec {
        let (w, h) = (mean[2], mean[3]);
        let wp = self.weights.position;
        MeasVec::new(wp * w, wp * h, wp * w, wp * h)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
