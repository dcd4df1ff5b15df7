use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::RpcError;

/// Contract for the backend RPC collaborator.
///
/// Replies are ordered sequences whose positional meaning is endpoint-specific;
/// see [`crate::replies`] for the typed views.
#[async_trait]
pub trait PredictClient: Send + Sync {
    /// Establish the connection. Idempotent once connected.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Connection` when the backend cannot be reached.
    async fn connect(&self) -> Result<(), RpcError>;

    /// Drop the connection flag; later predict calls fail until reconnected.
    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Call a named endpoint with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::NotConnected` before a successful `connect`, or other
    /// `RpcError`s for transport, remote or shape failures.
    async fn predict(&self, endpoint: Endpoint, args: Vec<Value>) -> Result<Vec<Value>, RpcError>;

    /// Base URL used to resolve server-side file paths.
    fn base_url(&self) -> &str;
}
