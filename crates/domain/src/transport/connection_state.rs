use serde::{Deserialize, Serialize};

/// Health of the WebSocket link to the vendor print service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// No socket, or the last one closed
    #[default]
    Disconnected,
    /// A socket is being opened
    Connecting,
    /// The socket is open and frames can be sent
    Connected,
}

impl ConnectionState {
    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Transition to connecting state
    pub fn to_connecting(&self) -> Result<Self, &'static str> {
        match self {
            Self::Disconnected => Ok(Self::Connecting),
            _ => Err("Can only connect from Disconnected state"),
        }
    }

    /// Transition to connected state (socket open event)
    pub fn to_connected(&self) -> Result<Self, &'static str> {
        match self {
            Self::Connecting => Ok(Self::Connected),
            _ => Err("Can only complete connection from Connecting state"),
        }
    }

    /// Transition to disconnected state (close, error or explicit disconnect)
    pub fn to_disconnected(&self) -> Self {
        Self::Disconnected
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_disconnected() {
        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(!state.is_connected());
    }

    #[test]
    fn test_transition_disconnected_to_connecting() {
        let next = ConnectionState::Disconnected.to_connecting().unwrap();
        assert_eq!(next, ConnectionState::Connecting);
    }

    #[test]
    fn test_transition_connecting_to_connected() {
        let next = ConnectionState::Connecting.to_connected().unwrap();
        assert!(next.is_connected());
    }

    #[test]
    fn test_cannot_connect_twice() {
        assert!(ConnectionState::Connecting.to_connecting().is_err());
        assert!(ConnectionState::Connected.to_connecting().is_err());
        assert!(ConnectionState::Disconnected.to_connected().is_err());
    }

    #[test]
    fn test_to_disconnected_from_any_state() {
        assert_eq!(
            ConnectionState::Connected.to_disconnected(),
            ConnectionState::Disconnected
        );
        assert_eq!(
            ConnectionState::Connecting.to_disconnected(),
            ConnectionState::Disconnected
        );
    }
}
