//! Wire shape of the vendor print service protocol.
//!
//! Requests and replies are correlated only by `apiName`; there is no message ID.

mod frame;

pub use frame::{ApiRequest, ApiResponse, ResultAck};

/// Success
pub const CODE_OK: i64 = 0;
/// Printer busy; transient, retried only for `startJob`
pub const CODE_DEVICE_BUSY: i64 = -2;
/// No device found; scans treat it as an empty list
pub const CODE_NO_DEVICE: i64 = 23;

/// Vendor API names, spelled exactly as the print service expects them
pub mod api {
    pub const INIT_SDK: &str = "initSdk";
    pub const GET_ALL_PRINTERS: &str = "getAllPrinters";
    pub const SCAN_WIFI_PRINTER: &str = "scanWifiPrinter";
    pub const SELECT_PRINTER: &str = "selectPrinter";
    pub const CONNECT_WIFI_PRINTER: &str = "connectWifiPrinter";
    pub const CLOSE_PRINTER: &str = "closePrinter";
    pub const START_JOB: &str = "startJob";
    pub const INIT_DRAWING_BOARD: &str = "InitDrawingBoard";
    pub const DRAW_TEXT: &str = "DrawLableText";
    pub const DRAW_BARCODE: &str = "DrawLableBarCode";
    pub const DRAW_QRCODE: &str = "DrawLableQrCode";
    pub const DRAW_IMAGE: &str = "DrawLableImage";
    pub const DRAW_LINE: &str = "DrawLableLine";
    pub const DRAW_GRAPH: &str = "DrawLableGraph";
    pub const COMMIT_JOB: &str = "commitJob";
    pub const END_JOB: &str = "endJob";
    pub const PRINT_STATUS: &str = "printStatus";
}
