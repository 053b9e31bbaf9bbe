// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-backend feature extraction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::estimator::{ConstantEstimator, DowntimeEstimator, EstimatorInput};
use super::record::{BackendFeatureRecord, FeatureValue};
use crate::backend::{BackendCapabilities, BackendHandle, BackendQuery};
use crate::error::{BackendError, ExtractionFailure};

/// Turns one backend's status and capabilities into a feature record.
///
/// Both queries are read-only and bounded by `timeout`. A failed or timed out
/// query yields [`FailureKind::ProviderUnavailable`]; unusable capabilities
/// yield [`FailureKind::MalformedCapabilities`]. Absent capabilities are not a
/// failure: the capability fields become `unknown`.
///
/// [`FailureKind::ProviderUnavailable`]: crate::error::FailureKind::ProviderUnavailable
/// [`FailureKind::MalformedCapabilities`]: crate::error::FailureKind::MalformedCapabilities
pub struct FeatureExtractor {
    query: Arc<dyn BackendQuery>,
    estimator: Arc<dyn DowntimeEstimator>,
    timeout: Duration,
}

impl FeatureExtractor {
    /// Create an extractor using the placeholder constant estimator.
    pub fn new(query: Arc<dyn BackendQuery>, timeout: Duration) -> Self {
        Self {
            query,
            estimator: Arc::new(ConstantEstimator::default()),
            timeout,
        }
    }

    /// Replace the downtime estimator.
    pub fn with_estimator(mut self, estimator: Arc<dyn DowntimeEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Extract the feature record for one backend.
    pub async fn extract(
        &self,
        handle: &BackendHandle,
    ) -> Result<BackendFeatureRecord, ExtractionFailure> {
        let status = self
            .bounded("status", self.query.get_status(handle))
            .await?;
        let capabilities = self
            .bounded("capabilities", self.query.get_capabilities(handle))
            .await?;

        let (num_qubits, primary_error_rate) = match &capabilities {
            Some(caps) => {
                let rate = checked_primary_error_rate(caps)?;
                (FeatureValue::Known(caps.num_qubits), FeatureValue::Known(rate))
            }
            None => {
                debug!(backend = %handle, "No capabilities reported");
                (FeatureValue::Unknown, FeatureValue::Unknown)
            }
        };

        let downtime_probability = self.estimate(&EstimatorInput {
            handle,
            status: &status,
            capabilities: capabilities.as_ref(),
        });

        Ok(BackendFeatureRecord {
            name: handle.name().to_string(),
            queue_length: status.pending_jobs,
            operational: status.operational,
            num_qubits,
            primary_error_rate,
            downtime_probability,
        })
    }

    async fn bounded<T, F>(&self, query: &str, fut: F) -> Result<T, ExtractionFailure>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(ExtractionFailure::from),
            Err(_) => Err(ExtractionFailure::provider_unavailable(format!(
                "{} query timed out after {:?}",
                query, self.timeout
            ))),
        }
    }

    fn estimate(&self, input: &EstimatorInput<'_>) -> f64 {
        let p = self.estimator.estimate(input);
        if (0.0..=1.0).contains(&p) {
            return p;
        }
        // NaN clamps to 1.0: no usable estimate reads as "assume down"
        let clamped = if p.is_nan() { 1.0 } else { p.clamp(0.0, 1.0) };
        warn!(
            backend = %input.handle,
            estimate = p,
            clamped,
            "Downtime estimate outside [0, 1]"
        );
        clamped
    }
}

fn checked_primary_error_rate(caps: &BackendCapabilities) -> Result<f64, ExtractionFailure> {
    if caps.num_qubits == 0 {
        return Err(ExtractionFailure::malformed("num_qubits is 0"));
    }

    let rate = caps
        .gate_error_rates
        .first()
        .copied()
        .ok_or_else(|| ExtractionFailure::malformed("gate_error_rates is empty"))?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(ExtractionFailure::malformed(format!(
            "primary error rate {} outside [0, 1]",
            rate
        )));
    }

    Ok(rate)
}
