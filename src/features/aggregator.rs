// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aggregation of per-backend records into a snapshot.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use super::extractor::FeatureExtractor;
use super::record::{BackendFeatureRecord, FeatureSnapshot};
use crate::backend::BackendHandle;
use crate::error::{ExtractionFailure, FailureKind};

/// A backend left out of the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFailure {
    /// Backend that failed
    pub handle: BackendHandle,
    /// Failure classification
    pub kind: FailureKind,
    /// Detail for logs
    pub message: String,
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Records of successfully extracted backends, in registry order
    pub snapshot: FeatureSnapshot,
    /// Failed backends, in registry order
    pub failures: Vec<BackendFailure>,
}

/// Drives extraction across all discovered backends.
///
/// Each handle is attempted exactly once. With `concurrency > 1` the
/// extractions run on a bounded pool of tokio tasks; results are collected by
/// position so the snapshot keeps registry order whatever the completion
/// order.
pub struct Aggregator {
    extractor: Arc<FeatureExtractor>,
    concurrency: usize,
}

impl Aggregator {
    /// Create an aggregator. A concurrency of 0 is treated as 1.
    pub fn new(extractor: FeatureExtractor, concurrency: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            concurrency: concurrency.max(1),
        }
    }

    /// Worker pool size.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Extract every handle and split the outcomes.
    pub async fn collect(&self, handles: Vec<BackendHandle>) -> Collection {
        let outcomes = if self.concurrency == 1 || handles.len() <= 1 {
            self.extract_sequential(&handles).await
        } else {
            self.extract_concurrent(&handles).await
        };

        let mut collection = Collection::default();
        for (handle, outcome) in handles.into_iter().zip(outcomes) {
            match outcome {
                Ok(record) => {
                    debug!(backend = %handle, "Extracted backend features");
                    collection.snapshot.push(record);
                }
                Err(failure) => {
                    warn!(
                        backend = %handle,
                        kind = %failure.kind,
                        error = %failure.message,
                        "Backend skipped"
                    );
                    collection.failures.push(BackendFailure {
                        handle,
                        kind: failure.kind,
                        message: failure.message,
                    });
                }
            }
        }

        info!(
            records = collection.snapshot.len(),
            failures = collection.failures.len(),
            "Aggregation complete"
        );
        collection
    }

    /// One extraction at a time, each in its own task so a panic stays
    /// scoped to its backend.
    async fn extract_sequential(
        &self,
        handles: &[BackendHandle],
    ) -> Vec<Result<BackendFeatureRecord, ExtractionFailure>> {
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let extractor = self.extractor.clone();
            let task_handle = handle.clone();
            let joined =
                tokio::spawn(async move { extractor.extract(&task_handle).await }).await;
            outcomes.push(join_outcome(handle, joined));
        }
        outcomes
    }

    async fn extract_concurrent(
        &self,
        handles: &[BackendHandle],
    ) -> Vec<Result<BackendFeatureRecord, ExtractionFailure>> {
        debug!(
            backends = handles.len(),
            concurrency = self.concurrency,
            "Dispatching extractions"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let tasks: Vec<_> = handles
            .iter()
            .cloned()
            .map(|handle| {
                let semaphore = semaphore.clone();
                let extractor = self.extractor.clone();
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return Err(ExtractionFailure::provider_unavailable(format!(
                                "worker pool closed: {}",
                                e
                            )))
                        }
                    };
                    extractor.extract(&handle).await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (handle, task) in handles.iter().zip(tasks) {
            outcomes.push(join_outcome(handle, task.await));
        }
        outcomes
    }
}

fn join_outcome(
    handle: &BackendHandle,
    joined: Result<Result<BackendFeatureRecord, ExtractionFailure>, JoinError>,
) -> Result<BackendFeatureRecord, ExtractionFailure> {
    joined.unwrap_or_else(|e| {
        error!(backend = %handle, error = %e, "Extraction task aborted");
        Err(ExtractionFailure::provider_unavailable(format!(
            "extraction task aborted: {}",
            e
        )))
    })
}
