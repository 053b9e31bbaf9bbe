// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Feature extraction and aggregation.
//!
//! - [`FeatureExtractor`]: one backend → one [`BackendFeatureRecord`] or a
//!   per-backend failure
//! - [`Aggregator`]: all backends → [`FeatureSnapshot`] plus failures
//! - [`DowntimeEstimator`]: pluggable `downtime_probability` source

pub mod aggregator;
pub mod estimator;
pub mod extractor;
pub mod record;

pub use aggregator::{Aggregator, BackendFailure, Collection};
pub use estimator::{
    ConstantEstimator, DowntimeEstimator, EstimatorInput, DEFAULT_DOWNTIME_PROBABILITY,
};
pub use extractor::FeatureExtractor;
pub use record::{BackendFeatureRecord, FeatureSnapshot, FeatureValue, UNKNOWN_MARKER};
