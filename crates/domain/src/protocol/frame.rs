use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CODE_OK;
use crate::error::SdkError;

/// Request frame: `{ "apiName": ..., "parameter"?: {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub api_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
}

impl ApiRequest {
    pub fn new(api_name: impl Into<String>, parameter: Option<Value>) -> Self {
        Self {
            api_name: api_name.into(),
            parameter,
        }
    }

    pub fn to_json(&self) -> Result<String, SdkError> {
        serde_json::to_string(self).map_err(|e| SdkError::Protocol(e.to_string()))
    }
}

/// The vendor's embedded result envelope
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultAck {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<Value>,
    /// `printStatus` frames carry `online` at this level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<String>,
}

/// Response (or unsolicited) frame from the print service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub result_ack: Option<ResultAck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn parse(raw: &str) -> Result<Self, SdkError> {
        serde_json::from_str(raw).map_err(|e| SdkError::Protocol(e.to_string()))
    }

    /// Missing envelope or code counts as success
    pub fn error_code(&self) -> i64 {
        self.result_ack.as_ref().map_or(CODE_OK, |ack| ack.error_code)
    }

    pub fn info(&self) -> Option<&Value> {
        self.result_ack.as_ref().and_then(|ack| ack.info.as_ref())
    }

    pub fn info_str(&self) -> Option<&str> {
        self.info().and_then(Value::as_str)
    }

    /// Unsolicited notification payload; such frames never answer a call
    pub fn callback(&self) -> Option<&Value> {
        self.result_ack.as_ref().and_then(|ack| ack.callback.as_ref())
    }

    pub fn callback_name(&self) -> Option<&str> {
        self.callback()
            .and_then(|cb| cb.get("name"))
            .and_then(Value::as_str)
    }

    /// Turn a non-zero result code into a typed vendor error
    pub fn into_result(self, api_name: &str) -> Result<Self, SdkError> {
        let code = self.error_code();
        if code == CODE_OK {
            return Ok(self);
        }
        let message = self
            .info_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("SDK error {}", code));
        Err(SdkError::Vendor {
            api_name: api_name.to_string(),
            code,
            message,
        })
    }
}
