//! Label content: boards, pages and drawable elements.

mod codes;
mod element;
mod page;

pub use codes::{
    BarcodeType, GraphType, LabelType, LineType, PrintMode, Rotation, TextAlign, TextPosition,
    TwoDimensionalCode, VerticalAlign,
};
pub use element::{
    BarcodeElement, BorderElement, GraphElement, ImageElement, LabelElement, LineElement,
    QrCodeElement, TextElement,
};
pub use page::{LabelBoard, LabelPage};
