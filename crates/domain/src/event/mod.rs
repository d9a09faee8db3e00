use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{api, ApiResponse};

/// Notifications about the print service and the device, outside any call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceEvent {
    /// WebSocket to the print service opened
    ServiceConnected { timestamp: DateTime<Utc> },

    /// WebSocket to the print service closed
    ServiceDisconnected { timestamp: DateTime<Utc> },

    /// Printer lid opened or closed
    CoverStatusChanged {
        status: Value,
        timestamp: DateTime<Utc>,
    },

    /// Battery level changed (1-4 on battery models)
    PowerLevelChanged {
        level: Value,
        timestamp: DateTime<Utc>,
    },

    /// The print service reports the printer went offline
    PrinterOffline { timestamp: DateTime<Utc> },
}

impl DeviceEvent {
    pub fn service_connected() -> Self {
        Self::ServiceConnected {
            timestamp: Utc::now(),
        }
    }

    pub fn service_disconnected() -> Self {
        Self::ServiceDisconnected {
            timestamp: Utc::now(),
        }
    }

    /// Extract a notification from an inbound frame, if it carries one
    pub fn from_frame(frame: &ApiResponse) -> Option<Self> {
        let ack = frame.result_ack.as_ref()?;

        if frame.api_name.as_deref() == Some(api::PRINT_STATUS)
            && ack.online.as_deref() == Some("offline")
        {
            return Some(Self::PrinterOffline {
                timestamp: Utc::now(),
            });
        }

        let callback = frame.callback()?;
        match frame.callback_name()? {
            "onCoverStatusChange" => Some(Self::CoverStatusChanged {
                status: callback.get("coverStatus").cloned().unwrap_or(Value::Null),
                timestamp: Utc::now(),
            }),
            // the vendor spells the field `powerLever`
            "onElectricityChange" => Some(Self::PowerLevelChanged {
                level: callback.get("powerLever").cloned().unwrap_or(Value::Null),
                timestamp: Utc::now(),
            }),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ServiceConnected { timestamp } => *timestamp,
            Self::ServiceDisconnected { timestamp } => *timestamp,
            Self::CoverStatusChanged { timestamp, .. } => *timestamp,
            Self::PowerLevelChanged { timestamp, .. } => *timestamp,
            Self::PrinterOffline { timestamp } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::ServiceConnected { .. } => "ServiceConnected",
            Self::ServiceDisconnected { .. } => "ServiceDisconnected",
            Self::CoverStatusChanged { .. } => "CoverStatusChanged",
            Self::PowerLevelChanged { .. } => "PowerLevelChanged",
            Self::PrinterOffline { .. } => "PrinterOffline",
        }
    }
}
