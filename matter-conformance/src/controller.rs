//! The remote side of a test: reading attributes from and invoking commands
//! on the device under test.
//!
//! Implementations own timeouts and any retry policy. The checker never
//! retries a failed call.

use async_trait::async_trait;
use matter_data_model::{
    AttributeId, ClusterId, CommandRequest, EndpointId, ImStatus, InvokeResponse, Value,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out waiting for the device")]
    Timeout,

    #[error("device unreachable: {0}")]
    Unreachable(String),

    #[error("device answered with {0}")]
    Status(ImStatus),
}

#[async_trait]
pub trait DeviceController: Send + Sync {
    async fn read_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Result<Value, TransportError>;

    /// Sends a command. A status-only answer from the device is a successful
    /// exchange and comes back as [`InvokeResponse::Status`].
    async fn invoke(
        &self,
        endpoint: EndpointId,
        request: CommandRequest,
    ) -> Result<InvokeResponse, TransportError>;
}
