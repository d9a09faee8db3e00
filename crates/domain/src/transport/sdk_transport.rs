use async_trait::async_trait;

use super::connection_state::ConnectionState;
use crate::error::SdkError;

/// What a transport reports upward to the call correlator
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The socket opened
    Opened,
    /// The socket closed or errored; in-flight calls can no longer be answered
    Closed,
    /// One raw text frame from the print service
    Frame(String),
}

/// Transport trait that infrastructure implementations must provide.
///
/// Inbound traffic is not pulled through this trait: implementations push
/// [`TransportEvent`]s into the channel handed out at construction.
#[async_trait]
pub trait SdkTransport: Send + Sync {
    /// Open the socket if it is not already open or opening
    async fn connect(&self) -> Result<(), SdkError>;

    /// Close the socket and suspend automatic reconnection
    async fn disconnect(&self);

    /// True only while the socket is actually open
    fn is_connected(&self) -> bool;

    /// Get current connection state
    fn connection_state(&self) -> ConnectionState;

    /// Write one JSON text frame, failing immediately when not connected
    fn send(&self, frame: String) -> Result<(), SdkError>;
}
