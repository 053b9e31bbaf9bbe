// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for collector tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{
    BackendCapabilities, BackendHandle, BackendQuery, BackendRegistry, BackendStatusSnapshot,
};
use crate::error::{BackendError, Error, Result};
use crate::features::FeatureSnapshot;
use crate::sink::SnapshotSink;

/// Scripted outcome of one mock query.
#[derive(Debug, Clone)]
pub enum MockResponse<T> {
    /// Return the value
    Ok(T),
    /// Fail with the error
    Fail(BackendError),
    /// Never complete
    Hang,
}

#[derive(Debug, Clone)]
struct MockEntry {
    name: String,
    status: MockResponse<BackendStatusSnapshot>,
    capabilities: MockResponse<Option<BackendCapabilities>>,
    delay: Duration,
}

#[derive(Debug, Default)]
struct CallStats {
    status_calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a CallStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a CallStats) -> Self {
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted registry and query provider.
///
/// Clones share call statistics.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    entries: Vec<MockEntry>,
    registry: Option<MockResponse<()>>,
    stats: Arc<CallStats>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend that answers both queries.
    pub fn backend(
        self,
        name: &str,
        pending_jobs: u64,
        operational: bool,
        capabilities: Option<(u32, Vec<f64>)>,
    ) -> Self {
        let capabilities = capabilities.map(|(num_qubits, gate_error_rates)| BackendCapabilities {
            num_qubits,
            gate_error_rates,
        });
        self.entry(
            name,
            MockResponse::Ok(BackendStatusSnapshot {
                pending_jobs,
                operational,
            }),
            MockResponse::Ok(capabilities),
        )
    }

    /// Add a backend with scripted query outcomes.
    pub fn entry(
        mut self,
        name: &str,
        status: MockResponse<BackendStatusSnapshot>,
        capabilities: MockResponse<Option<BackendCapabilities>>,
    ) -> Self {
        self.entries.push(MockEntry {
            name: name.to_string(),
            status,
            capabilities,
            delay: Duration::ZERO,
        });
        self
    }

    /// Delay the status query of every backend by `delay(index)`.
    pub fn with_delays(mut self, delay: impl Fn(usize) -> Duration) -> Self {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.delay = delay(i);
        }
        self
    }

    /// Make `list_backends` fail.
    pub fn failing_registry(mut self, error: BackendError) -> Self {
        self.registry = Some(MockResponse::Fail(error));
        self
    }

    /// Make `list_backends` never complete.
    pub fn hanging_registry(mut self) -> Self {
        self.registry = Some(MockResponse::Hang);
        self
    }

    /// Number of `get_status` calls made for a backend.
    pub fn status_calls(&self, name: &str) -> usize {
        self.stats
            .status_calls
            .lock()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of concurrent `get_status` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }

    fn find(&self, handle: &BackendHandle) -> std::result::Result<&MockEntry, BackendError> {
        self.entries
            .iter()
            .find(|e| e.name == handle.name())
            .ok_or_else(|| BackendError::NotFound(handle.name().to_string()))
    }
}

async fn respond<T: Clone>(response: &MockResponse<T>) -> std::result::Result<T, BackendError> {
    match response {
        MockResponse::Ok(v) => Ok(v.clone()),
        MockResponse::Fail(e) => Err(e.clone()),
        MockResponse::Hang => std::future::pending().await,
    }
}

#[async_trait]
impl BackendRegistry for MockProvider {
    async fn list_backends(&self) -> std::result::Result<Vec<BackendHandle>, BackendError> {
        if let Some(response) = &self.registry {
            respond(response).await?;
        }
        Ok(self
            .entries
            .iter()
            .map(|e| BackendHandle::new(e.name.clone()))
            .collect())
    }
}

#[async_trait]
impl BackendQuery for MockProvider {
    async fn get_status(
        &self,
        handle: &BackendHandle,
    ) -> std::result::Result<BackendStatusSnapshot, BackendError> {
        let entry = self.find(handle)?;
        *self
            .stats
            .status_calls
            .lock()
            .entry(entry.name.clone())
            .or_insert(0) += 1;

        let _guard = InFlight::enter(&self.stats);
        if !entry.delay.is_zero() {
            tokio::time::sleep(entry.delay).await;
        }
        respond(&entry.status).await
    }

    async fn get_capabilities(
        &self,
        handle: &BackendHandle,
    ) -> std::result::Result<Option<BackendCapabilities>, BackendError> {
        let entry = self.find(handle)?;
        respond(&entry.capabilities).await
    }
}

/// Random delay in `[0, max_ms)` milliseconds.
pub fn random_delay(max_ms: u64) -> Duration {
    let entropy = uuid::Uuid::new_v4().as_u128();
    Duration::from_millis((entropy % u128::from(max_ms.max(1))) as u64)
}

/// Sink that keeps every written snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    written: Arc<Mutex<Vec<FeatureSnapshot>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots written so far.
    pub fn written(&self) -> Vec<FeatureSnapshot> {
        self.written.lock().clone()
    }
}

#[async_trait]
impl SnapshotSink for MemorySink {
    async fn write(&self, snapshot: &FeatureSnapshot) -> Result<()> {
        self.written.lock().push(snapshot.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Sink that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

#[async_trait]
impl SnapshotSink for FailingSink {
    async fn write(&self, _snapshot: &FeatureSnapshot) -> Result<()> {
        Err(Error::WriteFailure("mock sink refused the snapshot".to_string()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}
