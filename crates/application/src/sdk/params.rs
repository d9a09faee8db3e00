//! Vendor-mandated default parameters and the typed payloads merged over them.

use serde::Serialize;
use serde_json::{Map, Value, json};

use domain::label::{
    BarcodeElement, GraphElement, ImageElement, LabelBoard, LineElement, QrCodeElement,
    TextElement,
};

/// Shallow merge: every key in `overrides` replaces the default
pub fn merge_params(defaults: Value, overrides: Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(mut base), Value::Object(over)) => {
            base.extend(over);
            Value::Object(base)
        }
        (base, Value::Null) => base,
        (_, over) => over,
    }
}

/// Serialize `payload` and lay it over `defaults`
pub fn with_defaults<T: Serialize>(defaults: Value, payload: &T) -> Value {
    let overrides = serde_json::to_value(payload).unwrap_or_else(|_| Value::Object(Map::new()));
    merge_params(defaults, overrides)
}

pub fn init_sdk_defaults() -> Value {
    json!({
        "fontDir": "",
        "isOpenPort": true,
        "isCloseANE": true,
        "printCallBackType": 0
    })
}

pub fn init_board_defaults() -> Value {
    json!({
        "rotate": 0,
        "path": "ZT001.ttf",
        "verticalShift": 0,
        "HorizontalShift": 0
    })
}

pub fn text_defaults() -> Value {
    json!({
        "rotate": 0,
        "fontFamily": "宋体",
        "textAlignHorizonral": 0,
        "textAlignVertical": 0,
        "letterSpacing": 0,
        "lineSpacing": 1,
        "lineMode": 6,
        "fontStyle": [false, false, false, false]
    })
}

pub fn barcode_defaults() -> Value {
    json!({
        "rotate": 0,
        "fontSize": 3.2,
        "textHeight": 3.2,
        "textPosition": 0
    })
}

pub fn qrcode_defaults() -> Value {
    json!({ "codeType": 31, "rotate": 0 })
}

pub fn image_defaults() -> Value {
    json!({
        "rotate": 0,
        "imageProcessingType": 0,
        "imageProcessingValue": 127
    })
}

pub fn line_defaults() -> Value {
    json!({ "rotate": 0, "lineType": 1, "dashwidth": [1, 1] })
}

pub fn graph_defaults() -> Value {
    json!({ "rotate": 0, "lineType": 1, "dashwidth": [1, 1], "cornerRadius": 0 })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardParams {
    pub width: f64,
    pub height: f64,
    pub rotate: u16,
}

impl From<&LabelBoard> for BoardParams {
    fn from(board: &LabelBoard) -> Self {
        Self {
            width: board.width,
            height: board.height,
            rotate: board.rotate.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextParams<'a> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: &'a str,
    pub font_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<&'a str>,
    pub rotate: u16,
    // vendor spelling
    pub text_align_horizonral: u8,
    pub text_align_vertical: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_mode: Option<u8>,
    /// bold, italic, underline, strikethrough
    pub font_style: [bool; 4],
}

impl<'a> From<&'a TextElement> for TextParams<'a> {
    fn from(el: &'a TextElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            value: &el.value,
            font_size: el.font_size,
            font_family: el.font_family.as_deref(),
            rotate: el.rotate.into(),
            text_align_horizonral: el.align.code(),
            text_align_vertical: el.vertical_align.code(),
            letter_spacing: el.letter_spacing,
            line_spacing: el.line_spacing,
            line_mode: el.line_mode,
            font_style: [el.bold, el.italic, el.underline, el.strikethrough],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeParams<'a> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: &'a str,
    pub code_type: u8,
    pub rotate: u16,
    pub text_position: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_height: Option<f64>,
}

impl<'a> From<&'a BarcodeElement> for BarcodeParams<'a> {
    fn from(el: &'a BarcodeElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            value: &el.value,
            code_type: el.barcode_type.code(),
            rotate: el.rotate.into(),
            text_position: el.text_position.code(),
            font_size: el.font_size,
            text_height: el.text_height,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeParams<'a> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: &'a str,
    pub code_type: u8,
    pub rotate: u16,
}

impl<'a> From<&'a QrCodeElement> for QrCodeParams<'a> {
    fn from(el: &'a QrCodeElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            value: &el.value,
            code_type: el.code_type.code(),
            rotate: el.rotate.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParams<'a> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub image_data: &'a str,
    pub rotate: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_processing_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_processing_value: Option<u8>,
}

impl<'a> From<&'a ImageElement> for ImageParams<'a> {
    fn from(el: &'a ImageElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            image_data: strip_data_uri(&el.image_data),
            rotate: el.rotate.into(),
            image_processing_type: el.image_processing_type,
            image_processing_value: el.image_processing_value,
        }
    }
}

/// Drop a `data:image/<fmt>;base64,` prefix; the device wants bare base64
pub fn strip_data_uri(data: &str) -> &str {
    let Some(rest) = data.strip_prefix("data:image/") else {
        return data;
    };
    match rest.find(";base64,") {
        Some(idx) if !rest[..idx].contains(';') => &rest[idx + ";base64,".len()..],
        _ => data,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: u16,
    pub line_type: u8,
    #[serde(rename = "dashwidth", skip_serializing_if = "Option::is_none")]
    pub dash_width: Option<[f64; 2]>,
}

impl From<&LineElement> for LineParams {
    fn from(el: &LineElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            rotate: el.rotate.into(),
            line_type: el.line_type.code(),
            dash_width: el.dash_width,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: u16,
    pub graph_type: u8,
    pub line_width: f64,
    pub line_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(rename = "dashwidth", skip_serializing_if = "Option::is_none")]
    pub dash_width: Option<[f64; 2]>,
}

impl From<&GraphElement> for GraphParams {
    fn from(el: &GraphElement) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            rotate: el.rotate.into(),
            graph_type: el.graph_type.code(),
            line_width: el.line_width,
            line_type: el.line_type.code(),
            corner_radius: el.corner_radius,
            dash_width: el.dash_width,
        }
    }
}
