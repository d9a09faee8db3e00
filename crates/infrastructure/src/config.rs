use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use domain::label::{LabelType, PrintMode};
use domain::settings::{CallTimeouts, RetrySettings, SdkTimings, WorkaroundSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Required in `x-api-key` when set
    #[serde(default)]
    pub api_key: Option<String>,
    /// Exact addresses or IPv4 CIDR blocks; empty allows everyone
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            allowed_ips: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SdkConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:37989".to_string()
}
fn default_reconnect_interval() -> u64 {
    3000
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnect_interval_ms: default_reconnect_interval(),
        }
    }
}

impl SdkConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

/// Job parameters used when a request leaves them out
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PrintDefaults {
    #[serde(default = "default_density")]
    pub density: u8,
    #[serde(default = "default_label_type")]
    pub label_type: u8,
    #[serde(default = "default_print_mode")]
    pub print_mode: u8,
}

fn default_density() -> u8 {
    3
}
fn default_label_type() -> u8 {
    LabelType::GapPaper.code()
}
fn default_print_mode() -> u8 {
    PrintMode::Thermal.code()
}

impl Default for PrintDefaults {
    fn default() -> Self {
        Self {
            density: default_density(),
            label_type: default_label_type(),
            print_mode: default_print_mode(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub print: PrintDefaults,
    #[serde(default)]
    pub timings: SdkTimings,
    #[serde(default)]
    pub timeouts: CallTimeouts,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub workarounds: WorkaroundSettings,
}

impl BridgeConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::builder(config_dir, &run_mode)?
            // Environment variables (e.g. BRIDGE__SDK__WS_URL=ws://10.0.0.5:37989)
            .add_source(
                Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_ips")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Defaults plus the optional config files, without the environment
    fn builder(
        config_dir: &str,
        run_mode: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            // Start with default settings
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("sdk.ws_url", default_ws_url())?
            .set_default("sdk.reconnect_interval_ms", default_reconnect_interval() as i64)?
            // Shared settings, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false)))
    }

    /// Map a request's label type (name or numeric code) to the vendor code
    pub fn resolve_label_type(&self, value: Option<&serde_json::Value>) -> u8 {
        resolve_code(value, LabelType::from_name, |t| t.code())
            .unwrap_or(self.print.label_type)
    }

    /// Map a request's print mode (name or numeric code) to the vendor code
    pub fn resolve_print_mode(&self, value: Option<&serde_json::Value>) -> u8 {
        resolve_code(value, PrintMode::from_name, |m| m.code()).unwrap_or(self.print.print_mode)
    }
}

/// Numbers pass through; known names map to their code; anything else is `None`
fn resolve_code<T>(
    value: Option<&serde_json::Value>,
    from_name: impl Fn(&str) -> Option<T>,
    code: impl Fn(&T) -> u8,
) -> Option<u8> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        serde_json::Value::String(name) => from_name(name).as_ref().map(code),
        _ => None,
    }
}
