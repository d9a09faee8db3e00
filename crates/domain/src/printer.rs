use serde::{Deserialize, Serialize};

/// How the print service reaches a printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Usb,
    Wifi,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usb => "usb",
            Self::Wifi => "wifi",
        }
    }
}

/// The physical device selected for printing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterHandle {
    #[serde(rename = "printerName")]
    pub name: String,
    pub port: u32,
    #[serde(default)]
    pub kind: ConnectionKind,
}

impl PrinterHandle {
    pub fn usb(name: impl Into<String>, port: u32) -> Self {
        Self {
            name: name.into(),
            port,
            kind: ConnectionKind::Usb,
        }
    }

    pub fn wifi(name: impl Into<String>, port: u32) -> Self {
        Self {
            name: name.into(),
            port,
            kind: ConnectionKind::Wifi,
        }
    }
}

impl std::fmt::Display for PrinterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.name, self.port, self.kind.as_str())
    }
}
