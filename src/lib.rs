// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Backend Feature Collector
//!
//! This crate builds a snapshot of per-backend features (queue length,
//! operational state, qubit count, primary gate error rate and an estimated
//! downtime probability) from a quantum hardware provider and writes it as a
//! JSON document for downstream schedulers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Pipeline                   │
//! ├──────────────────┬──────────────────────┤
//! │   Aggregator     │   SnapshotSink       │
//! │   (tokio pool)   │   (atomic JSON)      │
//! ├──────────────────┴──────────────────────┤
//! │          FeatureExtractor                │
//! ├────────────────┬────────────────────────┤
//! │  IBM Provider  │   Fixture Registry     │
//! │  (reqwest)     │   (YAML)               │
//! └────────────────┴────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`backend`]: Registry/query traits and providers
//! - [`features`]: Extraction, estimation and aggregation
//! - [`sink`]: Snapshot persistence
//! - [`pipeline`]: One collection run
//! - [`error`]: Error types

pub mod backend;
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod sink;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunReport};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
