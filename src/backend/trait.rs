// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registry and query collaborator traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Opaque identifier of one backend.
///
/// Only used as a key into status and capability queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendHandle {
    name: String,
}

impl BackendHandle {
    /// Create a handle for the named backend.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Backend name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Live operational status of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatusSnapshot {
    /// Jobs waiting in the backend queue
    pub pending_jobs: u64,
    /// Whether the backend accepts jobs
    pub operational: bool,
}

/// Static capability metadata of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendCapabilities {
    /// Number of qubits
    pub num_qubits: u32,
    /// Gate error rates in reporting order
    #[serde(default)]
    pub gate_error_rates: Vec<f64>,
}

/// Enumerates the backends a provider exposes.
#[async_trait]
pub trait BackendRegistry: Send + Sync {
    /// List backend handles in the provider's enumeration order.
    async fn list_backends(&self) -> Result<Vec<BackendHandle>, BackendError>;
}

/// Reads status and capabilities for a single backend.
#[async_trait]
pub trait BackendQuery: Send + Sync {
    /// Read the current status. Never cached.
    async fn get_status(&self, handle: &BackendHandle)
        -> Result<BackendStatusSnapshot, BackendError>;

    /// Read capabilities.
    ///
    /// `Ok(None)` means the provider has no capability data for this backend,
    /// which is distinct from a failed query.
    async fn get_capabilities(
        &self,
        handle: &BackendHandle,
    ) -> Result<Option<BackendCapabilities>, BackendError>;
}

/// A provider that is both a registry and a query interface.
pub trait BackendProvider: BackendRegistry + BackendQuery {}

impl<T: BackendRegistry + BackendQuery> BackendProvider for T {}
