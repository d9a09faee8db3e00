//! Compensation for two vendor defects.
//!
//! Single-copy jobs misprint unless the device is told to expect one more
//! label, so a throwaway placeholder is printed first. Rectangles drawn with
//! `DrawLableGraph` lose edges on multi-label jobs, so borders are always four
//! separate lines.

use std::borrow::Cow;

use domain::label::{
    BarcodeElement, BorderElement, GraphElement, GraphType, ImageElement, LabelBoard,
    LabelElement, LineElement, QrCodeElement, TextAlign, TextElement, VerticalAlign,
};
use domain::settings::WorkaroundSettings;

/// Count for `startJob` and whether a placeholder label must lead the job
pub fn device_count(logical_copies: u32, settings: &WorkaroundSettings) -> (u32, bool) {
    if logical_copies <= settings.single_copy_threshold {
        (logical_copies + 1, true)
    } else {
        (logical_copies, false)
    }
}

/// Minimal content for the placeholder: the text centred on the board
pub fn placeholder_element(board: &LabelBoard, text: &str) -> TextElement {
    let mut el = TextElement::new(0.0, 0.0, board.width, board.height, text);
    el.align = TextAlign::Center;
    el.vertical_align = VerticalAlign::Middle;
    el
}

/// One vendor draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp<'a> {
    Text(&'a TextElement),
    Barcode(&'a BarcodeElement),
    Qrcode(&'a QrCodeElement),
    Image(&'a ImageElement),
    Line(Cow<'a, LineElement>),
    Graph(&'a GraphElement),
}

/// Draw calls for one element, with rectangles split into lines
pub fn expand<'a>(element: &'a LabelElement, settings: &WorkaroundSettings) -> Vec<DrawOp<'a>> {
    match element {
        LabelElement::Text(el) => vec![DrawOp::Text(el)],
        LabelElement::Barcode(el) => vec![DrawOp::Barcode(el)],
        LabelElement::Qrcode(el) => vec![DrawOp::Qrcode(el)],
        LabelElement::Image(el) => vec![DrawOp::Image(el)],
        LabelElement::Line(el) => vec![DrawOp::Line(Cow::Borrowed(el))],
        LabelElement::Border(border) => border_lines(border),
        LabelElement::Graph(graph)
            if graph.graph_type == GraphType::Rectangle && settings.split_rectangles =>
        {
            border_lines(&BorderElement::from(graph))
        }
        LabelElement::Graph(el) => vec![DrawOp::Graph(el)],
    }
}

fn border_lines(border: &BorderElement) -> Vec<DrawOp<'static>> {
    border
        .edges()
        .into_iter()
        .map(|edge| DrawOp::Line(Cow::Owned(edge)))
        .collect()
}
