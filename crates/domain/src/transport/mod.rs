mod connection_state;
mod sdk_transport;

pub use connection_state::ConnectionState;
pub use sdk_transport::{SdkTransport, TransportEvent};
