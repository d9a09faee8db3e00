use serde::{Deserialize, Serialize};

use super::codes::Rotation;
use super::element::LabelElement;

/// Physical canvas declared with `InitDrawingBoard`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelBoard {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotate: Rotation,
}

impl LabelBoard {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotate: Rotation::default(),
        }
    }
}

/// One physical label design, printed `copies` times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPage {
    pub board: LabelBoard,
    #[serde(default)]
    pub elements: Vec<LabelElement>,
    pub copies: u32,
}

impl LabelPage {
    pub fn new(board: LabelBoard, elements: Vec<LabelElement>, copies: u32) -> Self {
        Self {
            board,
            elements,
            copies,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.board.width > 0.0 && self.board.height > 0.0) {
            return Err(format!(
                "label size must be positive, got {}x{}",
                self.board.width, self.board.height
            ));
        }
        if self.copies == 0 {
            return Err("copies must be at least 1".to_string());
        }
        self.elements.iter().try_for_each(LabelElement::validate)
    }
}
