//! Error types for onboard-flow.

use std::time::Duration;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Graph model integrity errors. The model is left unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Page {id} already exists")]
    DuplicatePage { id: String },

    #[error("Invalid page: {reason}")]
    InvalidPage { reason: String },

    #[error("Page {id} not found")]
    UnknownPage { id: String },

    #[error("Transition {from} -> {to} references a page that does not exist")]
    UnknownEndpoint { from: String, to: String },

    #[error("Transition {from} -> {to} already exists")]
    DuplicateTransition { from: String, to: String },

    #[error("Transition {id} not found")]
    UnknownTransition { id: String },

    #[error("Component {component} is already assigned to page {page}")]
    DuplicateAssignment { page: String, component: String },

    #[error("Component {component} is required and cannot be removed from page {page}")]
    ProtectedComponent { page: String, component: String },

    #[error("Component {component} is not assigned to page {page}")]
    NotAssigned { page: String, component: String },
}

/// Configuration document decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed configuration: {reason}")]
    MalformedConfiguration { reason: String },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConfiguration {
            reason: reason.into(),
        }
    }
}

/// Backend request errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{operation} returned HTTP {status}: {body}")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} request failed: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("Invalid response from {operation}: {reason}")]
    InvalidResponse { operation: String, reason: String },

    #[error("Cannot encode {operation} request: {reason}")]
    InvalidRequest { operation: String, reason: String },

    #[error("{operation} is already in flight")]
    Busy { operation: String },
}

impl GatewayError {
    /// Whether this is a network failure (non-2xx status or transport error).
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport { .. })
    }
}

/// Wizard session errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Page {page} uses component {component}, which has no field contract")]
    UnknownComponent { page: String, component: String },

    #[error("Page {page} is missing from the configuration")]
    UnknownPage { page: String },

    #[error("Cannot derive a page sequence: {reason}")]
    InvalidSequence { reason: String },

    #[error("Field {field} is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("A submission is already in flight")]
    SubmissionPending,

    #[error("Session is closed ({step})")]
    SessionClosed { step: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
