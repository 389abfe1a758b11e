//! Fundamental types for the bounding-box state estimator.

use nalgebra::{Matrix4, SMatrix, SVector, Vector4};

// ---------------------------------------------------------------------------
// Scalar type: use f64 throughout for numerical precision in the Kalman filter.
// ---------------------------------------------------------------------------

/// Number of measured box components per detection.
///
/// Both supported state layouts measure four components: either
/// (x-center, y-center, aspect, height) or (x-center, y-center, width, height).
pub const NDIM: usize = 4;

/// Full state dimension: `NDIM` position-like components followed by their
/// velocities.
pub const SDIM: usize = 2 * NDIM;

/// 8-DOF state vector, position block first:
/// `[p0, p1, p2, p3, v0, v1, v2, v3]` in pixels / pixels-per-frame.
pub type StateVec = SVector<f64, SDIM>;

/// 8×8 state covariance matrix. Invariant: symmetric positive semi-definite.
pub type StateCov = SMatrix<f64, SDIM, SDIM>;

/// A measurement in box space: the `NDIM` position-like components of a
/// detection, same units and ordering as the state's position block.
pub type MeasVec = Vector4<f64>;

/// 4×4 covariance in measurement space (projected state + innovation noise).
pub type MeasCov = Matrix4<f64>;

/// Constant-velocity motion matrix F (8×8).
pub type MotionMat = SMatrix<f64, SDIM, SDIM>;

/// Observation matrix H (4×8): identity projection onto the position block.
pub type ObservationMat = SMatrix<f64, NDIM, SDIM>;
