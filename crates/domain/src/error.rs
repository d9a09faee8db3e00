use thiserror::Error;

use crate::job::JobPhase;

/// Errors raised while talking to the vendor print service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    #[error("WebSocket not connected to Jingchen SDK")]
    NotConnected,

    #[error("Connection to Jingchen SDK dropped while waiting for {api_name}")]
    ConnectionDropped { api_name: String },

    #[error("{message}")]
    Vendor {
        api_name: String,
        code: i64,
        message: String,
    },

    #[error("API timeout: {api_name}")]
    Timeout { api_name: String },

    /// The protocol has no message IDs, so a second call with the same API name
    /// would steal the first call's reply.
    #[error("A call to {0} is already in flight")]
    CallInFlight(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl SdkError {
    /// Vendor error code, if the failure came from the device
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for the vendor's transient "printer busy" reply
    pub fn is_device_busy(&self) -> bool {
        self.code() == Some(crate::protocol::CODE_DEVICE_BUSY)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConnected | Self::ConnectionDropped { .. } => "transport",
            Self::Vendor { .. } => "protocol",
            Self::Timeout { .. } => "timeout",
            Self::CallInFlight(_) | Self::Protocol(_) => "protocol",
        }
    }
}

/// A device command was issued out of the job's legal order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot {action} while job is {phase:?}")]
pub struct SequenceError {
    pub action: &'static str,
    pub phase: JobPhase,
}

impl SequenceError {
    pub fn new(action: &'static str, phase: JobPhase) -> Self {
        Self { action, phase }
    }
}

/// Terminal failure of a print request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("Invalid job sequence: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Printer busy, another job is in progress")]
    Busy,

    #[error("No USB printers found")]
    NoPrinter,

    #[error("Invalid job request: {0}")]
    InvalidRequest(String),

    #[error("Print job aborted: {0}")]
    Aborted(String),
}

impl JobError {
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Sdk(e) => e.code(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sdk(e) => e.kind(),
            Self::Sequence(_) => "sequence",
            Self::Busy => "busy",
            Self::NoPrinter => "no_printer",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Aborted(_) => "aborted",
        }
    }
}

pub type Result<T> = std::result::Result<T, JobError>;
