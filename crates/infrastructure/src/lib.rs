//! Infrastructure layer - External integrations

pub mod config;
pub mod sdk;

pub use config::BridgeConfig;
pub use sdk::{CallCorrelator, MockTransport, WebSocketTransport};
