//! Error types for the remote crate.

use thiserror::Error;

use crate::endpoint::Endpoint;

/// A reply whose shape does not match what the endpoint is known to return.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{endpoint} returned a malformed response: {reason}")]
pub struct MalformedReply {
    pub endpoint: Endpoint,
    pub reason: String,
}

impl MalformedReply {
    #[must_use]
    pub fn new(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            reason: reason.into(),
        }
    }
}

/// Errors emitted by predict clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcError {
    #[error("client not connected")]
    NotConnected,
    #[error("invalid base url {raw}: {reason}")]
    InvalidBaseUrl { raw: String, reason: String },
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} failed: {message}")]
    Remote { endpoint: Endpoint, message: String },
    #[error("result stream failed: {0}")]
    Stream(String),
    #[error(transparent)]
    Malformed(#[from] MalformedReply),
    #[error("request failed: {0}")]
    Request(String),
}
