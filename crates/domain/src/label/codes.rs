//! Friendly names for the vendor's numeric parameter codes.

use serde::{Deserialize, Serialize};

/// Paper type passed to `startJob`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelType {
    GapPaper,
    BlackMark,
    Continuous,
    HolePaper,
    Transparent,
    Nameplate,
    BlackMarkGap,
}

impl LabelType {
    pub const ALL: [LabelType; 7] = [
        Self::GapPaper,
        Self::BlackMark,
        Self::Continuous,
        Self::HolePaper,
        Self::Transparent,
        Self::Nameplate,
        Self::BlackMarkGap,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Self::GapPaper => 1,
            Self::BlackMark => 2,
            Self::Continuous => 3,
            Self::HolePaper => 4,
            Self::Transparent => 5,
            Self::Nameplate => 6,
            Self::BlackMarkGap => 10,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
    }
}

/// Thermal or thermal-transfer printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintMode {
    Thermal,
    Transfer,
}

impl PrintMode {
    pub fn code(&self) -> u8 {
        match self {
            Self::Thermal => 1,
            Self::Transfer => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
    }
}

/// One-dimensional barcode symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeType {
    #[default]
    Code128,
    UpcA,
    UpcE,
    Ean8,
    Ean13,
    Code93,
    Code39,
    Codebar,
    Itf25,
}

impl BarcodeType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Code128 => 20,
            Self::UpcA => 21,
            Self::UpcE => 22,
            Self::Ean8 => 23,
            Self::Ean13 => 24,
            Self::Code93 => 25,
            Self::Code39 => 26,
            Self::Codebar => 27,
            Self::Itf25 => 28,
        }
    }
}

/// Two-dimensional code symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TwoDimensionalCode {
    #[default]
    QrCode,
    Pdf417,
    DataMatrix,
    Aztec,
}

impl TwoDimensionalCode {
    pub fn code(&self) -> u8 {
        match self {
            Self::QrCode => 31,
            Self::Pdf417 => 32,
            Self::DataMatrix => 33,
            Self::Aztec => 34,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn code(&self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn code(&self) -> u8 {
        match self {
            Self::Top => 0,
            Self::Middle => 1,
            Self::Bottom => 2,
        }
    }
}

/// Where a barcode prints its human-readable text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    #[default]
    Bottom,
    Top,
    None,
}

impl TextPosition {
    pub fn code(&self) -> u8 {
        match self {
            Self::Bottom => 0,
            Self::Top => 1,
            Self::None => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
}

impl LineType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Solid => 1,
            Self::Dashed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphType {
    Circle,
    Ellipse,
    Rectangle,
    RoundedRectangle,
}

impl GraphType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Circle => 1,
            Self::Ellipse => 2,
            Self::Rectangle => 3,
            Self::RoundedRectangle => 4,
        }
    }
}

/// Element or board rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(format!("Invalid rotation: {} (expected 0, 90, 180 or 270)", other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}
