// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! IBM Quantum provider via the Qiskit Runtime REST API.
//!
//! # Architecture
//!
//! The provider is generic over [`IbmHttpClient`], enabling deterministic
//! testing with a mock client while using [`ReqwestIbmClient`] in production.
//!
//! # Field mapping
//!
//! | Runtime endpoint                      | Collector field                  |
//! |---------------------------------------|----------------------------------|
//! | `GET /backends`                       | registry order                   |
//! | `GET /backends/{name}/status`         | `state`, `length_queue`          |
//! | `GET /backends/{name}/properties`     | `gate_error` of each `gates[]`   |
//! | `GET /backends/{name}/configuration`  | `n_qubits`                       |

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::r#trait::{
    BackendCapabilities, BackendHandle, BackendQuery, BackendRegistry, BackendStatusSnapshot,
};
use crate::config::IbmConfig;
use crate::error::BackendError;

pub use client::{IbmHttpClient, ReqwestIbmClient};

/// Name of the calibration parameter holding a gate's error rate.
const GATE_ERROR_PARAMETER: &str = "gate_error";

/// Response of `GET /backends`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmDevicesResponse {
    pub devices: Vec<String>,
}

/// Response of `GET /backends/{name}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmStatusResponse {
    /// Whether the backend accepts jobs
    pub state: bool,
    /// Pending jobs
    pub length_queue: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /backends/{name}/properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmPropertiesResponse {
    #[serde(default)]
    pub backend_name: Option<String>,
    #[serde(default)]
    pub gates: Vec<IbmGateProperties>,
}

impl IbmPropertiesResponse {
    /// `gate_error` values in document order.
    pub fn gate_error_rates(&self) -> Vec<f64> {
        self.gates
            .iter()
            .flat_map(|gate| gate.parameters.iter())
            .filter(|p| p.name == GATE_ERROR_PARAMETER)
            .map(|p| p.value)
            .collect()
    }
}

/// Calibration data of one gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmGateProperties {
    pub gate: String,
    #[serde(default)]
    pub qubits: Vec<u32>,
    #[serde(default)]
    pub parameters: Vec<IbmNduv>,
}

/// Name/date/unit/value calibration entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmNduv {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Response of `GET /backends/{name}/configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmConfigurationResponse {
    pub n_qubits: u32,
    #[serde(default)]
    pub backend_name: Option<String>,
}

/// IBM Quantum backend provider.
///
/// Generic over the HTTP client for testability.
pub struct IbmProvider<C: IbmHttpClient = ReqwestIbmClient> {
    client: C,
}

impl IbmProvider<ReqwestIbmClient> {
    /// Create a provider from configuration.
    ///
    /// Fails if no auth token is configured.
    pub fn from_config(config: &IbmConfig) -> Result<Self, BackendError> {
        let client = ReqwestIbmClient::from_config(config)?;
        debug!(url = %config.api_url, "IBM Quantum provider configured");
        Ok(Self { client })
    }
}

impl<C: IbmHttpClient> IbmProvider<C> {
    /// Create a provider with a custom HTTP client.
    pub fn with_client(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: IbmHttpClient> BackendRegistry for IbmProvider<C> {
    async fn list_backends(&self) -> Result<Vec<BackendHandle>, BackendError> {
        let devices = self.client.list_devices().await?;
        Ok(devices.into_iter().map(BackendHandle::new).collect())
    }
}

#[async_trait]
impl<C: IbmHttpClient> BackendQuery for IbmProvider<C> {
    async fn get_status(
        &self,
        handle: &BackendHandle,
    ) -> Result<BackendStatusSnapshot, BackendError> {
        let status = self.client.get_status(handle.name()).await?;
        Ok(BackendStatusSnapshot {
            pending_jobs: status.length_queue,
            operational: status.state,
        })
    }

    async fn get_capabilities(
        &self,
        handle: &BackendHandle,
    ) -> Result<Option<BackendCapabilities>, BackendError> {
        let Some(properties) = self.client.get_properties(handle.name()).await? else {
            debug!(backend = %handle, "No calibration properties published");
            return Ok(None);
        };
        let configuration = self.client.get_configuration(handle.name()).await?;

        Ok(Some(BackendCapabilities {
            num_qubits: configuration.n_qubits,
            gate_error_rates: properties.gate_error_rates(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::client::MockIbmClient;
    use super::*;

    fn status(state: bool, length_queue: u64) -> IbmStatusResponse {
        IbmStatusResponse {
            state,
            length_queue,
            status: Some(if state { "active" } else { "internal" }.into()),
            message: None,
        }
    }

    fn configuration(n_qubits: u32) -> IbmConfigurationResponse {
        IbmConfigurationResponse {
            n_qubits,
            backend_name: None,
        }
    }

    fn properties_json() -> &'static str {
        r#"{
            "backend_name": "ibm_brisbane",
            "gates": [
                {"gate": "sx", "qubits": [0], "parameters": [
                    {"date": "2026-10-01T00:00:00Z", "name": "gate_error", "unit": "", "value": 0.00025},
                    {"date": "2026-10-01T00:00:00Z", "name": "gate_length", "unit": "ns", "value": 60.0}
                ]},
                {"gate": "ecr", "qubits": [0, 1], "parameters": [
                    {"name": "gate_length", "unit": "ns", "value": 660.0},
                    {"name": "gate_error", "unit": "", "value": 0.0071}
                ]}
            ]
        }"#
    }

    fn mock() -> MockIbmClient {
        let mut client = MockIbmClient {
            devices: vec!["ibm_brisbane".into(), "ibm_kyiv".into()],
            ..Default::default()
        };
        client.statuses.insert("ibm_brisbane".into(), status(true, 12));
        client.statuses.insert("ibm_kyiv".into(), status(false, 0));
        client.properties.insert(
            "ibm_brisbane".into(),
            serde_json::from_str(properties_json()).unwrap(),
        );
        client
            .configurations
            .insert("ibm_brisbane".into(), configuration(127));
        client
            .configurations
            .insert("ibm_kyiv".into(), configuration(127));
        client
    }

    #[test]
    fn test_gate_error_rates_in_document_order() {
        let properties: IbmPropertiesResponse = serde_json::from_str(properties_json()).unwrap();
        assert_eq!(properties.gate_error_rates(), vec![0.00025, 0.0071]);
    }

    #[test]
    fn test_status_response_requires_state_and_queue() {
        let missing_queue = r#"{"state": true, "status": "active"}"#;
        assert!(serde_json::from_str::<IbmStatusResponse>(missing_queue).is_err());

        let full = r#"{"state": false, "status": "internal", "message": "maintenance", "length_queue": 7, "backend_version": "1.3.0"}"#;
        let parsed: IbmStatusResponse = serde_json::from_str(full).unwrap();
        assert!(!parsed.state);
        assert_eq!(parsed.length_queue, 7);
    }

    #[tokio::test]
    async fn test_list_backends_keeps_order() {
        let provider = IbmProvider::with_client(mock());
        let handles = provider.list_backends().await.unwrap();
        let names: Vec<_> = handles.iter().map(BackendHandle::name).collect();
        assert_eq!(names, vec!["ibm_brisbane", "ibm_kyiv"]);
    }

    #[tokio::test]
    async fn test_list_backends_error() {
        let client = MockIbmClient {
            devices_error: Some(BackendError::AuthenticationFailed("401".into())),
            ..Default::default()
        };
        let provider = IbmProvider::with_client(client);
        assert!(matches!(
            provider.list_backends().await,
            Err(BackendError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let provider = IbmProvider::with_client(mock());
        let status = provider
            .get_status(&BackendHandle::new("ibm_brisbane"))
            .await
            .unwrap();
        assert_eq!(
            status,
            BackendStatusSnapshot {
                pending_jobs: 12,
                operational: true
            }
        );
    }

    #[tokio::test]
    async fn test_status_failure_propagates() {
        let provider = IbmProvider::with_client(mock());
        let result = provider.get_status(&BackendHandle::new("ibm_gone")).await;
        assert!(matches!(result, Err(BackendError::Http(_))));
    }

    #[tokio::test]
    async fn test_capabilities_combine_properties_and_configuration() {
        let provider = IbmProvider::with_client(mock());
        let caps = provider
            .get_capabilities(&BackendHandle::new("ibm_brisbane"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(caps.num_qubits, 127);
        assert_eq!(caps.gate_error_rates, vec![0.00025, 0.0071]);
    }

    #[tokio::test]
    async fn test_capabilities_absent_without_properties() {
        let provider = IbmProvider::with_client(mock());
        let caps = provider
            .get_capabilities(&BackendHandle::new("ibm_kyiv"))
            .await
            .unwrap();
        assert!(caps.is_none());
    }

    #[tokio::test]
    async fn test_capabilities_without_configuration_fail() {
        let mut client = mock();
        client.configurations.remove("ibm_brisbane");
        let provider = IbmProvider::with_client(client);
        let result = provider
            .get_capabilities(&BackendHandle::new("ibm_brisbane"))
            .await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_properties_without_gate_errors_yield_empty_rates() {
        let mut client = mock();
        client.properties.insert(
            "ibm_kyiv".into(),
            IbmPropertiesResponse {
                backend_name: Some("ibm_kyiv".into()),
                gates: vec![],
            },
        );
        let provider = IbmProvider::with_client(client);
        let caps = provider
            .get_capabilities(&BackendHandle::new("ibm_kyiv"))
            .await
            .unwrap()
            .unwrap();
        assert!(caps.gate_error_rates.is_empty());
    }

    #[test]
    fn test_from_config_requires_token() {
        let result = IbmProvider::from_config(&IbmConfig::default());
        assert!(matches!(
            result,
            Err(BackendError::AuthenticationFailed(_))
        ));
    }
}
