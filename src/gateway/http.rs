//! HTTP gateway — JSON over `reqwest` against the onboarding backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::codec::ConfigurationDocument;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

use super::SubmissionGateway;
use super::inflight::InFlightFlag;
use super::types::{Operation, ProfileUpdate, RegisterRequest, RegisterResponse, UserRecord};

/// Backend client. Each operation kind allows one request in flight; a second
/// call of the same kind fails with [`GatewayError::Busy`] without touching
/// the network.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    in_flight: [InFlightFlag; Operation::ALL.len()],
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport {
                operation: "client".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout: config.request_timeout,
            in_flight: Default::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, op: Operation) -> String {
        format!("{}{}", self.base_url, op.path())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        op: Operation,
        body: Option<serde_json::Value>,
    ) -> Result<T, GatewayError> {
        let _guard = self.in_flight[op.index()]
            .try_acquire()
            .ok_or_else(|| GatewayError::Busy {
                operation: op.to_string(),
            })?;

        let url = self.url(op);
        debug!(operation = %op, %url, "Sending backend request");

        let request = if op.is_post() {
            self.client
                .post(&url)
                .json(&body.unwrap_or(serde_json::Value::Null))
        } else {
            self.client.get(&url).header(CONTENT_TYPE, "application/json")
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation = %op, status = status.as_u16(), "Backend rejected request");
            return Err(GatewayError::Http {
                operation: op.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| self.request_error(op, e))
    }

    fn request_error(&self, op: Operation, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            warn!(operation = %op, timeout = ?self.timeout, "Backend request timed out");
            GatewayError::Timeout {
                operation: op.to_string(),
                timeout: self.timeout,
            }
        } else if err.is_decode() {
            GatewayError::InvalidResponse {
                operation: op.to_string(),
                reason: err.to_string(),
            }
        } else {
            warn!(operation = %op, error = %err, "Backend request failed");
            GatewayError::Transport {
                operation: op.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

fn to_body<T: Serialize>(op: Operation, value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::InvalidRequest {
        operation: op.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn save_config(
        &self,
        document: &ConfigurationDocument,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = to_body(Operation::SaveConfig, document)?;
        self.call(Operation::SaveConfig, Some(body)).await
    }

    async fn fetch_config(&self) -> Result<serde_json::Value, GatewayError> {
        self.call(Operation::FetchConfig, None).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, GatewayError> {
        let body = to_body(Operation::Register, request)?;
        self.call(Operation::Register, Some(body)).await
    }

    async fn update_profile(
        &self,
        request: &ProfileUpdate,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = to_body(Operation::UpdateProfile, request)?;
        self.call(Operation::UpdateProfile, Some(body)).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, GatewayError> {
        self.call(Operation::ListUsers, None).await
    }
}
