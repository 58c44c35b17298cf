//! Submission gateway — the boundary to the onboarding backend.
//!
//! The editor and the wizard only see the [`SubmissionGateway`] trait. The
//! [`HttpGateway`] implementation talks JSON over HTTP; tests substitute their
//! own implementations.

pub mod http;
pub mod inflight;
pub mod types;

use async_trait::async_trait;

use crate::codec::ConfigurationDocument;
use crate::error::GatewayError;

pub use http::HttpGateway;
pub use inflight::{InFlightFlag, InFlightGuard};
pub use types::{
    Operation, ProfileUpdate, RegisterRequest, RegisterResponse, UserId, UserRecord,
};

/// Async request/response contract with the backend.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// `POST /save-config`. The success payload is opaque.
    async fn save_config(
        &self,
        document: &ConfigurationDocument,
    ) -> Result<serde_json::Value, GatewayError>;

    /// `GET /get-config`. Returned raw so the codec can validate the schema.
    async fn fetch_config(&self) -> Result<serde_json::Value, GatewayError>;

    /// `POST /register/`.
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, GatewayError>;

    /// `POST /login/update-profile/`. The success payload is opaque.
    async fn update_profile(
        &self,
        request: &ProfileUpdate,
    ) -> Result<serde_json::Value, GatewayError>;

    /// `GET /data`.
    async fn list_users(&self) -> Result<Vec<UserRecord>, GatewayError>;
}
