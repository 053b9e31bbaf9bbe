// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the feature collector.
//!
//! Errors come in two tiers:
//!
//! - [`Error`] aborts a run (configuration, registry, output write).
//! - [`ExtractionFailure`] is scoped to a single backend and is recorded by
//!   the aggregator without stopping the batch.
//!
//! [`BackendError`] is what the provider collaborators return; the pipeline
//! decides which tier a given occurrence lands in.

use std::fmt;

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Run-level error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// The backend registry could not be enumerated
    RegistryUnavailable(BackendError),
    /// The snapshot could not be persisted
    WriteFailure(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::RegistryUnavailable(e) => write!(f, "Registry unavailable: {}", e),
            Error::WriteFailure(msg) => write!(f, "Write failure: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::RegistryUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Errors raised by the registry and query collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Backend not found
    NotFound(String),
    /// Provider unavailable
    Unavailable(String),
    /// Authentication failed
    AuthenticationFailed(String),
    /// Timeout
    Timeout(String),
    /// Invalid request
    InvalidRequest(String),
    /// HTTP error (for the IBM provider)
    Http(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotFound(name) => write!(f, "Backend not found: {}", name),
            BackendError::Unavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            BackendError::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            BackendError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            BackendError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            BackendError::Http(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Why a single backend is missing from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A status or capability query failed or timed out
    ProviderUnavailable,
    /// Capabilities were returned but cannot yield a feature record
    MalformedCapabilities,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ProviderUnavailable => write!(f, "ProviderUnavailable"),
            FailureKind::MalformedCapabilities => write!(f, "MalformedCapabilities"),
        }
    }
}

/// A per-backend extraction failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

impl ExtractionFailure {
    /// A failed or timed-out provider query.
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ProviderUnavailable,
            message: message.into(),
        }
    }

    /// Capabilities present but unusable.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MalformedCapabilities,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExtractionFailure {}

/// Every collaborator error is a transport-level failure for that backend.
impl From<BackendError> for ExtractionFailure {
    fn from(e: BackendError) -> Self {
        ExtractionFailure::provider_unavailable(e.to_string())
    }
}
