// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! One collection run: registry → extraction → aggregation → sink.
//!
//! A [`Pipeline`] holds no state between runs. Registry and sink failures
//! abort the run; per-backend failures are reported in the [`RunReport`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::backend::{BackendProvider, BackendRegistry, FixtureRegistry};
use crate::config::{CollectorConfig, Config, ProviderKind};
use crate::error::{BackendError, Error, Result};
use crate::features::{
    Aggregator, BackendFailure, ConstantEstimator, DowntimeEstimator, FeatureExtractor,
    FeatureSnapshot,
};
use crate::sink::{JsonFileSink, SnapshotSink};

#[cfg(feature = "ibm")]
use crate::backend::ibm::IbmProvider;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Backends returned by the registry
    pub discovered: usize,
    /// Snapshot that was written
    pub snapshot: FeatureSnapshot,
    /// Backends left out of the snapshot
    pub failures: Vec<BackendFailure>,
}

/// The collection pipeline.
pub struct Pipeline {
    registry: Arc<dyn BackendRegistry>,
    aggregator: Aggregator,
    sink: Arc<dyn SnapshotSink>,
    registry_timeout: Duration,
}

impl Pipeline {
    /// Assemble a pipeline from its parts.
    pub fn new(
        registry: Arc<dyn BackendRegistry>,
        aggregator: Aggregator,
        sink: Arc<dyn SnapshotSink>,
        registry_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            aggregator,
            sink,
            registry_timeout,
        }
    }

    /// Build the pipeline described by `config`: the selected provider and a
    /// JSON file sink at the configured output path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sink: Arc<dyn SnapshotSink> =
            Arc::new(JsonFileSink::new(&config.output.path).pretty(config.output.pretty));

        match config.provider.kind {
            ProviderKind::Fixture => {
                let path = config.provider.fixture.path.as_deref().ok_or_else(|| {
                    Error::Config(
                        "fixture provider selected but no fixture path configured".into(),
                    )
                })?;
                let registry = FixtureRegistry::load(path)?;
                Ok(Self::from_provider(
                    Arc::new(registry),
                    &config.collector,
                    sink,
                ))
            }
            ProviderKind::Ibm => Self::ibm(config, sink),
        }
    }

    #[cfg(feature = "ibm")]
    fn ibm(config: &Config, sink: Arc<dyn SnapshotSink>) -> Result<Self> {
        let provider = IbmProvider::from_config(&config.provider.ibm)
            .map_err(|e| Error::Config(format!("IBM Quantum provider: {}", e)))?;
        Ok(Self::from_provider(
            Arc::new(provider),
            &config.collector,
            sink,
        ))
    }

    #[cfg(not(feature = "ibm"))]
    fn ibm(_config: &Config, _sink: Arc<dyn SnapshotSink>) -> Result<Self> {
        Err(Error::Config(
            "IBM Quantum provider not compiled in; rebuild with the `ibm` feature or use --fixture"
                .into(),
        ))
    }

    /// Build a pipeline over a provider that serves both registry and
    /// queries, using the constant estimator from `config`.
    pub fn from_provider<P>(
        provider: Arc<P>,
        config: &CollectorConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self
    where
        P: BackendProvider + 'static,
    {
        let estimator = Arc::new(ConstantEstimator::new(config.downtime_probability));
        Self::with_estimator(provider, config, sink, estimator)
    }

    /// Like [`Pipeline::from_provider`] with a custom estimator.
    pub fn with_estimator<P>(
        provider: Arc<P>,
        config: &CollectorConfig,
        sink: Arc<dyn SnapshotSink>,
        estimator: Arc<dyn DowntimeEstimator>,
    ) -> Self
    where
        P: BackendProvider + 'static,
    {
        let timeout = config.query_timeout();
        let extractor =
            FeatureExtractor::new(provider.clone(), timeout).with_estimator(estimator);
        Self::new(
            provider,
            Aggregator::new(extractor, config.concurrency),
            sink,
            timeout,
        )
    }

    /// Execute one run.
    pub async fn run(&self) -> Result<RunReport> {
        let span = info_span!("collect", run_id = %Uuid::new_v4());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<RunReport> {
        let handles = match tokio::time::timeout(
            self.registry_timeout,
            self.registry.list_backends(),
        )
        .await
        {
            Ok(Ok(handles)) => handles,
            Ok(Err(e)) => return Err(Error::RegistryUnavailable(e)),
            Err(_) => {
                return Err(Error::RegistryUnavailable(BackendError::Timeout(format!(
                    "backend listing exceeded {:?}",
                    self.registry_timeout
                ))))
            }
        };

        let discovered = handles.len();
        info!(
            backends = discovered,
            concurrency = self.aggregator.concurrency(),
            "Discovered backends"
        );

        let collection = self.aggregator.collect(handles).await;
        self.sink.write(&collection.snapshot).await?;

        info!(
            sink = %self.sink.describe(),
            records = collection.snapshot.len(),
            failures = collection.failures.len(),
            "Collection run complete"
        );

        Ok(RunReport {
            discovered,
            snapshot: collection.snapshot,
            failures: collection.failures,
        })
    }
}
