// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend registry.
//!
//! [`FixtureRegistry`] holds an ordered list of backends with canned status
//! and capability data. It backs offline runs (`--fixture`), replays of a
//! recorded provider state, and tests.
//!
//! # Fixture format
//!
//! ```yaml
//! backends:
//!   - name: ibm_brisbane
//!     status: { pending_jobs: 3, operational: true }
//!     capabilities: { num_qubits: 127, gate_error_rates: [0.0002, 0.0071] }
//!   - name: ibm_simulator
//!     status: { pending_jobs: 0, operational: true }
//!   - name: ibm_offline      # no status: queries fail
//! ```

use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    BackendCapabilities, BackendHandle, BackendQuery, BackendRegistry, BackendStatusSnapshot,
};
use crate::error::{BackendError, Error, Result};

/// One backend entry of a fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureBackend {
    /// Backend name
    pub name: String,

    /// Status returned by `get_status`; `None` makes the query fail
    #[serde(default)]
    pub status: Option<BackendStatusSnapshot>,

    /// Capabilities returned by `get_capabilities`
    #[serde(default)]
    pub capabilities: Option<BackendCapabilities>,
}

impl FixtureBackend {
    /// Backend with status and no capability data.
    pub fn new(name: &str, pending_jobs: u64, operational: bool) -> Self {
        Self {
            name: name.to_string(),
            status: Some(BackendStatusSnapshot {
                pending_jobs,
                operational,
            }),
            capabilities: None,
        }
    }

    /// Attach capabilities.
    pub fn with_capabilities(mut self, num_qubits: u32, gate_error_rates: Vec<f64>) -> Self {
        self.capabilities = Some(BackendCapabilities {
            num_qubits,
            gate_error_rates,
        });
        self
    }
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    backends: Vec<FixtureBackend>,
}

/// Ordered, thread-safe registry of fixture backends.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    /// Registered backends, in enumeration order
    backends: RwLock<Vec<FixtureBackend>>,
}

impl FixtureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of backends, keeping their order.
    pub fn from_backends(backends: Vec<FixtureBackend>) -> Self {
        let registry = Self::new();
        for backend in backends {
            registry.register(backend);
        }
        registry
    }

    /// Load a registry from a YAML fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Fixture file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let file: FixtureFile = serde_yaml::from_str(&content)?;
        info!(
            path = %path.display(),
            backends = file.backends.len(),
            "Loaded backend fixture"
        );

        Ok(Self::from_backends(file.backends))
    }

    /// Register a backend.
    ///
    /// A backend with the same name is replaced in place and keeps its
    /// position; new backends are appended.
    pub fn register(&self, backend: FixtureBackend) {
        let mut backends = self.backends.write();
        match backends.iter_mut().find(|b| b.name == backend.name) {
            Some(existing) => {
                debug!(backend = %backend.name, "Replacing fixture backend");
                *existing = backend;
            }
            None => {
                debug!(backend = %backend.name, "Registering fixture backend");
                backends.push(backend);
            }
        }
    }

    /// List all registered backend names in order.
    pub fn list(&self) -> Vec<String> {
        self.backends.read().iter().map(|b| b.name.clone()).collect()
    }

    /// Get the number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, name: &str) -> std::result::Result<FixtureBackend, BackendError> {
        self.backends
            .read()
            .iter()
            .find(|b| b.name == name)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl BackendRegistry for FixtureRegistry {
    async fn list_backends(&self) -> std::result::Result<Vec<BackendHandle>, BackendError> {
        Ok(self.list().into_iter().map(BackendHandle::new).collect())
    }
}

#[async_trait]
impl BackendQuery for FixtureRegistry {
    async fn get_status(
        &self,
        handle: &BackendHandle,
    ) -> std::result::Result<BackendStatusSnapshot, BackendError> {
        self.find(handle.name())?.status.ok_or_else(|| {
            BackendError::Unavailable(format!("no status recorded for {}", handle))
        })
    }

    async fn get_capabilities(
        &self,
        handle: &BackendHandle,
    ) -> std::result::Result<Option<BackendCapabilities>, BackendError> {
        Ok(self.find(handle.name())?.capabilities)
    }
}
