//! `motion_core` — Kalman filter motion estimation for bounding-box
//! multi-object tracking.
//!
//! Maintains a Gaussian belief (mean + covariance) over a box's position and
//! velocity, predicts it forward one frame at a time under a constant-velocity
//! model, fuses it with noisy detections using confidence-adaptive measurement
//! noise, and computes chi-square-gateable distances between predicted states
//! and candidate measurements. The filter is stateless: the surrounding
//! tracker owns every `(mean, covariance)` pair and calls in here per frame.
//!
//! # Module layout
//! - [`types`]  — fixed-dimension state/measurement types
//! - [`noise`]  — noise-scale models (xyah and xywh box layouts)
//! - [`kf`]     — the filter core (initiate / predict / update / gating)
//! - [`gating`] — gating metrics and chi-square 0.95 thresholds
//! - [`error`]  — error type
//!
//! # Example
//!
//! ```
//! use motion_core::{KalmanFilter, MeasVec};
//!
//! let kf = KalmanFilter::xywh();
//! let (mean, cov) = kf.initiate(&MeasVec::new(100.0, 100.0, 50.0, 50.0));
//! let (mean, cov) = kf.predict(&mean, &cov);
//! let (mean, _cov) = kf
//!     .update(&mean, &cov, &MeasVec::new(105.0, 100.0, 50.0, 50.0), 0.9)
//!     .unwrap();
//! assert!((mean[0] - 105.0).abs() < 0.1);
//! ```

pub mod error;
pub mod gating;
pub mod kf;
pub mod noise;
pub mod types;

pub use error::EstimatorError;
pub use gating::{Metric, CHI2INV95};
pub use kf::{KalmanFilter, XyahKalmanFilter, XywhKalmanFilter};
pub use noise::{NoiseModel, NoiseWeights, XyahNoise, XywhNoise};
pub use types::{MeasCov, MeasVec, StateCov, StateVec, NDIM};
