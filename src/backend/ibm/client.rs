// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP client abstraction for the IBM Quantum Runtime API.
//!
//! Provides [`IbmHttpClient`] for abstracting HTTP operations and
//! [`ReqwestIbmClient`] for production use, with exponential backoff retry
//! and bearer token authentication.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::IbmConfig;
use crate::error::BackendError;

use super::{IbmConfigurationResponse, IbmDevicesResponse, IbmPropertiesResponse, IbmStatusResponse};

/// Upper bound on a single backoff delay.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Trait for IBM Quantum HTTP operations.
///
/// This trait enables testing the provider without real HTTP calls.
#[async_trait]
pub trait IbmHttpClient: Send + Sync {
    /// List backend names visible to the instance.
    async fn list_devices(&self) -> Result<Vec<String>, BackendError>;

    /// Get the live status of a backend.
    async fn get_status(&self, backend: &str) -> Result<IbmStatusResponse, BackendError>;

    /// Get calibration properties. `None` when the backend publishes none.
    async fn get_properties(
        &self,
        backend: &str,
    ) -> Result<Option<IbmPropertiesResponse>, BackendError>;

    /// Get the static configuration of a backend.
    async fn get_configuration(
        &self,
        backend: &str,
    ) -> Result<IbmConfigurationResponse, BackendError>;
}

/// Production HTTP client using reqwest with retry logic.
pub struct ReqwestIbmClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: SecretString,
    service_crn: Option<String>,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl std::fmt::Debug for ReqwestIbmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestIbmClient")
            .field("base_url", &self.base_url)
            .field("auth_token", &"[REDACTED]")
            .field("service_crn", &self.service_crn)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl ReqwestIbmClient {
    /// Create a new client from IBM configuration.
    pub fn from_config(config: &IbmConfig) -> Result<Self, BackendError> {
        let auth_token = config.auth_token.clone().ok_or_else(|| {
            BackendError::AuthenticationFailed(
                "IBM Quantum token not configured. Set IBM_QUANTUM_TOKEN or \
                 provider.ibm.auth_token"
                    .to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| BackendError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: SecretString::from(auth_token),
            service_crn: config.service_crn.clone(),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .bearer_auth(self.auth_token.expose_secret())
            .header("Accept", "application/json");
        match &self.service_crn {
            Some(crn) => request.header("Service-CRN", crn),
            None => request,
        }
    }

    /// GET a JSON resource with exponential backoff retry.
    ///
    /// Returns `Ok(None)` on 404.
    /// Retries on: 429, 5xx, connect/timeout errors.
    /// Does not retry: other 4xx.
    async fn get_with_retry<T>(&self, operation: &str, url: &str) -> Result<Option<T>, BackendError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<T>().await.map(Some).map_err(|e| {
                            BackendError::Http(format!("Failed to parse {operation} response: {e}"))
                        });
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }

                    let body = response.text().await.unwrap_or_default();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(BackendError::AuthenticationFailed(format!(
                            "{operation} auth failed ({status}): {body}"
                        )));
                    }
                    if status == StatusCode::BAD_REQUEST {
                        return Err(BackendError::InvalidRequest(format!(
                            "{operation} rejected ({status}): {body}"
                        )));
                    }

                    let error =
                        BackendError::Http(format!("{operation} failed ({status}): {body}"));
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(BackendError::Unavailable(format!(
                            "{operation} request error: {e}"
                        )));
                    } else {
                        return Err(BackendError::Http(format!(
                            "{operation} request error: {e}"
                        )));
                    }
                }
            }

            if attempt < self.max_retries {
                let delay = backoff_delay(self.retry_base_delay_ms, attempt);
                warn!(
                    attempt = attempt + 1,
                    max = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "{operation} failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BackendError::Http(format!(
                "{operation} failed after {} retries",
                self.max_retries
            ))
        }))
    }

    async fn get_required<T>(&self, operation: &str, url: &str) -> Result<T, BackendError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get_with_retry(operation, url)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("{operation}: {url}")))
    }
}

/// `min(base * 2^attempt, 30s)` plus 25% jitter on odd attempts.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let base = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    let capped = base.min(MAX_BACKOFF_MS);
    let jitter = capped / 4 * u64::from(attempt % 2);
    Duration::from_millis(capped + jitter)
}

#[async_trait]
impl IbmHttpClient for ReqwestIbmClient {
    async fn list_devices(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/backends", self.base_url);
        let response: IbmDevicesResponse = self.get_required("list_devices", &url).await?;
        debug!(count = response.devices.len(), "Listed IBM backends");
        Ok(response.devices)
    }

    async fn get_status(&self, backend: &str) -> Result<IbmStatusResponse, BackendError> {
        let url = format!("{}/backends/{}/status", self.base_url, backend);
        self.get_required("get_status", &url).await
    }

    async fn get_properties(
        &self,
        backend: &str,
    ) -> Result<Option<IbmPropertiesResponse>, BackendError> {
        let url = format!("{}/backends/{}/properties", self.base_url, backend);
        // a `null` body and a 404 both mean "no properties"
        let properties: Option<Option<IbmPropertiesResponse>> =
            self.get_with_retry("get_properties", &url).await?;
        Ok(properties.flatten())
    }

    async fn get_configuration(
        &self,
        backend: &str,
    ) -> Result<IbmConfigurationResponse, BackendError> {
        let url = format!("{}/backends/{}/configuration", self.base_url, backend);
        self.get_required("get_configuration", &url).await
    }
}

/// Mock IBM client for testing.
#[cfg(test)]
#[derive(Default)]
pub struct MockIbmClient {
    pub devices: Vec<String>,
    pub devices_error: Option<BackendError>,
    pub statuses: std::collections::HashMap<String, IbmStatusResponse>,
    pub properties: std::collections::HashMap<String, IbmPropertiesResponse>,
    pub configurations: std::collections::HashMap<String, IbmConfigurationResponse>,
}

#[cfg(test)]
#[async_trait]
impl IbmHttpClient for MockIbmClient {
    async fn list_devices(&self) -> Result<Vec<String>, BackendError> {
        match &self.devices_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.devices.clone()),
        }
    }

    async fn get_status(&self, backend: &str) -> Result<IbmStatusResponse, BackendError> {
        self.statuses
            .get(backend)
            .cloned()
            .ok_or_else(|| BackendError::Http(format!("get_status failed (503): {backend}")))
    }

    async fn get_properties(
        &self,
        backend: &str,
    ) -> Result<Option<IbmPropertiesResponse>, BackendError> {
        Ok(self.properties.get(backend).cloned())
    }

    async fn get_configuration(
        &self,
        backend: &str,
    ) -> Result<IbmConfigurationResponse, BackendError> {
        self.configurations
            .get(backend)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(backend.to_string()))
    }
}
