// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Backend providers.
//!
//! This module provides the collaborator traits the collector consumes and
//! the providers that implement them:
//!
//! - `ibm::IbmProvider`: IBM Quantum Runtime REST API (requires `ibm` feature)
//! - [`FixtureRegistry`]: ordered in-memory backends, optionally loaded from YAML

#[cfg(feature = "ibm")]
pub mod ibm;
pub mod registry;
pub mod r#trait;

pub use r#trait::{
    BackendCapabilities, BackendHandle, BackendProvider, BackendQuery, BackendRegistry,
    BackendStatusSnapshot,
};
pub use registry::{FixtureBackend, FixtureRegistry};
