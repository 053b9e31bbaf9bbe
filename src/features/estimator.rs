// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Downtime probability estimation.
//!
//! The extractor never computes `downtime_probability` itself; it asks a
//! [`DowntimeEstimator`]. [`ConstantEstimator`] is the placeholder until a
//! real model exists. Any `Fn(&EstimatorInput) -> f64` closure also works:
//!
//! ```ignore
//! let estimator = |input: &EstimatorInput<'_>| {
//!     if input.status.operational { 0.05 } else { 1.0 }
//! };
//! let extractor = FeatureExtractor::new(query, timeout).with_estimator(Arc::new(estimator));
//! ```

use crate::backend::{BackendCapabilities, BackendHandle, BackendStatusSnapshot};

/// Default placeholder downtime probability.
pub const DEFAULT_DOWNTIME_PROBABILITY: f64 = 0.1;

/// Data available to an estimator for one backend.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorInput<'a> {
    /// Backend being estimated
    pub handle: &'a BackendHandle,
    /// Status read during this extraction
    pub status: &'a BackendStatusSnapshot,
    /// Capabilities, if the provider reported any
    pub capabilities: Option<&'a BackendCapabilities>,
}

/// Estimates the probability a backend becomes unavailable.
pub trait DowntimeEstimator: Send + Sync {
    /// Probability in [0, 1].
    fn estimate(&self, input: &EstimatorInput<'_>) -> f64;
}

/// Returns the same probability for every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantEstimator {
    probability: f64,
}

impl ConstantEstimator {
    /// Create an estimator returning `probability`.
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    /// The constant returned.
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for ConstantEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNTIME_PROBABILITY)
    }
}

impl DowntimeEstimator for ConstantEstimator {
    fn estimate(&self, _input: &EstimatorInput<'_>) -> f64 {
        self.probability
    }
}

impl<F> DowntimeEstimator for F
where
    F: Fn(&EstimatorInput<'_>) -> f64 + Send + Sync,
{
    fn estimate(&self, input: &EstimatorInput<'_>) -> f64 {
        self(input)
    }
}
