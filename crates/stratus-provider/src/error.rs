//! Error types for stratus-provider.

use std::path::PathBuf;

use crate::remote::Service;

/// Result type alias using [`ProviderError`].
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure completing a request against a remote service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No endpoint is configured for the requested service.
    #[error("no endpoint configured for service '{0}'")]
    UnknownService(Service),

    /// The request URL could not be built.
    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl {
        /// URL that failed to parse.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("{service} returned status {status}: {body}")]
    Status {
        /// Service that was called.
        service: Service,
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Failure while synchronising a manifest to the content store.
///
/// Any variant is fatal to the whole sync call. Entries that were not
/// uploaded are picked up again by the next reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Local source content could not be read.
    #[error("failed to read '{}' for key '{key}': {source}", path.display())]
    Read {
        /// Remote key of the entry.
        key: String,
        /// Local source path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The remote PUT failed.
    #[error("upload failed for key '{key}': {source}")]
    Upload {
        /// Remote key of the entry.
        key: String,
        /// Underlying transport error.
        source: TransportError,
    },

    /// An upload task panicked or was aborted.
    #[error("upload worker failed: {0}")]
    Worker(String),
}

impl TransferError {
    /// Remote key the failure relates to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Read { key, .. } | Self::Upload { key, .. } => Some(key),
            Self::Worker(_) => None,
        }
    }
}

/// Failure while waiting for a deployment to settle.
///
/// Reaching the polling ceiling is not an error.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The status request failed.
    #[error("status check failed for distribution '{distribution_id}': {source}")]
    Transport {
        /// Distribution being polled.
        distribution_id: String,
        /// Underlying transport error.
        source: TransportError,
    },

    /// The wait was cancelled by the caller.
    #[error("wait for distribution '{0}' was cancelled")]
    Cancelled(String),
}

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Errors surfaced by the resource lifecycle providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// File synchronisation failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Deployment wait failed.
    #[error(transparent)]
    Wait(#[from] WaitError),

    /// Remote client could not be created or used.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
