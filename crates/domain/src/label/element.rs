use serde::{Deserialize, Serialize};

use super::codes::{
    BarcodeType, GraphType, LineType, Rotation, TextAlign, TextPosition, TwoDimensionalCode,
    VerticalAlign,
};

/// One drawable unit on a label. Coordinates and sizes are millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LabelElement {
    Text(TextElement),
    Barcode(BarcodeElement),
    Qrcode(QrCodeElement),
    Image(ImageElement),
    Line(LineElement),
    Graph(GraphElement),
    /// Rectangular outline, always drawn as four lines
    Border(BorderElement),
}

impl LabelElement {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Barcode(_) => "barcode",
            Self::Qrcode(_) => "qrcode",
            Self::Image(_) => "image",
            Self::Line(_) => "line",
            Self::Graph(_) => "graph",
            Self::Border(_) => "border",
        }
    }

    /// Local checks that can fail before anything reaches the device
    pub fn validate(&self) -> Result<(), String> {
        let (width, height) = match self {
            Self::Text(e) => (e.width, e.height),
            Self::Barcode(e) => (e.width, e.height),
            Self::Qrcode(e) => (e.width, e.height),
            Self::Image(e) => (e.width, e.height),
            Self::Line(e) => (e.width, e.height),
            Self::Graph(e) => (e.width, e.height),
            Self::Border(e) => (e.width, e.height),
        };
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(format!(
                "{} element has invalid size {}x{}",
                self.type_name(),
                width,
                height
            ));
        }
        match self {
            Self::Barcode(e) if e.value.is_empty() => {
                Err("barcode element requires a value".to_string())
            }
            Self::Qrcode(e) if e.value.is_empty() => {
                Err("qrcode element requires a value".to_string())
            }
            Self::Image(e) if e.image_data.is_empty() => {
                Err("image element requires imageData".to_string())
            }
            Self::Border(e) if e.line_width <= 0.0 => {
                Err("border lineWidth must be positive".to_string())
            }
            _ => Ok(()),
        }
    }
}

fn default_font_size() -> f64 {
    3.0
}

fn default_border_width() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_mode: Option<u8>,
}

impl TextElement {
    pub fn new(x: f64, y: f64, width: f64, height: f64, value: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            value: value.into(),
            font_size: default_font_size(),
            font_family: None,
            rotate: Rotation::default(),
            align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            letter_spacing: None,
            line_spacing: None,
            line_mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: String,
    #[serde(default)]
    pub barcode_type: BarcodeType,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub text_position: TextPosition,
    #[serde(default, rename = "barcodeFontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, rename = "barcodeTextHeight", skip_serializing_if = "Option::is_none")]
    pub text_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: String,
    #[serde(default, rename = "qrcodeType")]
    pub code_type: TwoDimensionalCode,
    #[serde(default)]
    pub rotate: Rotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Base64 payload, optionally with a `data:image/...;base64,` prefix
    #[serde(alias = "value")]
    pub image_data: String,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_processing_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_processing_value: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default, rename = "dashwidth", skip_serializing_if = "Option::is_none")]
    pub dash_width: Option<[f64; 2]>,
}

impl LineElement {
    /// Solid, unrotated line filling the given rectangle
    pub fn solid(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotate: Rotation::default(),
            line_type: LineType::Solid,
            dash_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub graph_type: GraphType,
    #[serde(default = "default_border_width")]
    pub line_width: f64,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, rename = "dashwidth", skip_serializing_if = "Option::is_none")]
    pub dash_width: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_border_width")]
    pub line_width: f64,
}

impl BorderElement {
    pub fn new(x: f64, y: f64, width: f64, height: f64, line_width: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            line_width,
        }
    }

    /// Top, bottom, left and right edges, each inside the outer rectangle
    pub fn edges(&self) -> [LineElement; 4] {
        let lw = self.line_width;
        [
            LineElement::solid(self.x, self.y, self.width, lw),
            LineElement::solid(self.x, self.y + self.height - lw, self.width, lw),
            LineElement::solid(self.x, self.y, lw, self.height),
            LineElement::solid(self.x + self.width - lw, self.y, lw, self.height),
        ]
    }
}

impl From<&GraphElement> for BorderElement {
    fn from(graph: &GraphElement) -> Self {
        Self::new(graph.x, graph.y, graph.width, graph.height, graph.line_width)
    }
}
