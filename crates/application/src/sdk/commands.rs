use std::sync::Arc;
use std::time::Duration;

use domain::error::SdkError;
use domain::label::{
    BarcodeElement, GraphElement, ImageElement, LabelBoard, LineElement, QrCodeElement,
    TextElement,
};
use domain::printer::{ConnectionKind, PrinterHandle};
use domain::protocol::{ApiResponse, CODE_NO_DEVICE, api};
use domain::settings::{CallTimeouts, SdkTimings};
use infrastructure::sdk::CallCorrelator;
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::params::{self, with_defaults};

/// Typed vendor commands over the call correlator.
///
/// Each command owns the settle delay the device needs after it, so callers
/// only sequence commands and never sleep themselves.
pub struct SdkCommands {
    correlator: Arc<CallCorrelator>,
    timings: SdkTimings,
    timeouts: CallTimeouts,
}

impl SdkCommands {
    pub fn new(correlator: Arc<CallCorrelator>, timings: SdkTimings, timeouts: CallTimeouts) -> Self {
        Self {
            correlator,
            timings,
            timeouts,
        }
    }

    pub fn correlator(&self) -> &Arc<CallCorrelator> {
        &self.correlator
    }

    async fn call(
        &self,
        api_name: &str,
        parameter: Option<Value>,
        timeout: Duration,
    ) -> Result<ApiResponse, SdkError> {
        self.correlator.invoke(api_name, parameter, timeout).await
    }

    async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    /// `initSdk`, then wait for the service to settle
    pub async fn init_sdk(&self) -> Result<(), SdkError> {
        self.call(
            api::INIT_SDK,
            Some(params::init_sdk_defaults()),
            self.timeouts.default_timeout(),
        )
        .await?;
        info!("Jingchen SDK initialised");
        self.settle(self.timings.after_init()).await;
        Ok(())
    }

    /// USB printers; "no device" is an empty list
    pub async fn scan_usb_printers(&self) -> Result<Vec<PrinterHandle>, SdkError> {
        match self
            .call(api::GET_ALL_PRINTERS, None, self.timeouts.default_timeout())
            .await
        {
            Ok(resp) => Ok(parse_usb_printers(resp.info())),
            Err(e) if e.code() == Some(CODE_NO_DEVICE) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// WiFi printers; the hardware scan is slow, hence the long timeout
    pub async fn scan_wifi_printers(&self) -> Result<Vec<PrinterHandle>, SdkError> {
        match self
            .call(api::SCAN_WIFI_PRINTER, None, self.timeouts.long())
            .await
        {
            Ok(resp) => Ok(parse_wifi_printers(resp.info())),
            Err(e) if e.code() == Some(CODE_NO_DEVICE) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn select_printer(&self, printer: &PrinterHandle) -> Result<(), SdkError> {
        let parameter = json!({ "printerName": printer.name, "port": printer.port });
        match printer.kind {
            ConnectionKind::Usb => {
                self.call(
                    api::SELECT_PRINTER,
                    Some(parameter),
                    self.timeouts.default_timeout(),
                )
                .await?
            }
            ConnectionKind::Wifi => {
                self.call(api::CONNECT_WIFI_PRINTER, Some(parameter), self.timeouts.long())
                    .await?
            }
        };
        info!(printer = %printer, "Printer selected");
        Ok(())
    }

    pub async fn close_printer(&self) -> Result<(), SdkError> {
        self.call(api::CLOSE_PRINTER, None, self.timeouts.default_timeout())
            .await?;
        Ok(())
    }

    /// A single `startJob` attempt; busy retries belong to the caller
    pub async fn start_job(
        &self,
        density: u8,
        label_type: u8,
        print_mode: u8,
        count: u32,
    ) -> Result<(), SdkError> {
        let parameter = json!({
            "printDensity": density,
            "printLabelType": label_type,
            "printMode": print_mode,
            "count": count,
        });
        self.call(
            api::START_JOB,
            Some(parameter),
            self.timeouts.default_timeout(),
        )
        .await?;
        Ok(())
    }

    pub async fn init_board(&self, board: &LabelBoard) -> Result<(), SdkError> {
        let parameter = with_defaults(
            params::init_board_defaults(),
            &params::BoardParams::from(board),
        );
        self.call(
            api::INIT_DRAWING_BOARD,
            Some(parameter),
            self.timeouts.default_timeout(),
        )
        .await?;
        Ok(())
    }

    async fn draw(&self, api_name: &str, parameter: Value) -> Result<(), SdkError> {
        self.call(api_name, Some(parameter), self.timeouts.default_timeout())
            .await?;
        self.settle(self.timings.between_draws()).await;
        Ok(())
    }

    pub async fn draw_text(&self, el: &TextElement) -> Result<(), SdkError> {
        let parameter = with_defaults(params::text_defaults(), &params::TextParams::from(el));
        self.draw(api::DRAW_TEXT, parameter).await
    }

    pub async fn draw_barcode(&self, el: &BarcodeElement) -> Result<(), SdkError> {
        let parameter =
            with_defaults(params::barcode_defaults(), &params::BarcodeParams::from(el));
        self.draw(api::DRAW_BARCODE, parameter).await
    }

    pub async fn draw_qrcode(&self, el: &QrCodeElement) -> Result<(), SdkError> {
        let parameter = with_defaults(params::qrcode_defaults(), &params::QrCodeParams::from(el));
        self.draw(api::DRAW_QRCODE, parameter).await
    }

    pub async fn draw_image(&self, el: &ImageElement) -> Result<(), SdkError> {
        let parameter = with_defaults(params::image_defaults(), &params::ImageParams::from(el));
        self.draw(api::DRAW_IMAGE, parameter).await
    }

    pub async fn draw_line(&self, el: &LineElement) -> Result<(), SdkError> {
        let parameter = with_defaults(params::line_defaults(), &params::LineParams::from(el));
        self.draw(api::DRAW_LINE, parameter).await
    }

    pub async fn draw_graph(&self, el: &GraphElement) -> Result<(), SdkError> {
        let parameter = with_defaults(params::graph_defaults(), &params::GraphParams::from(el));
        self.draw(api::DRAW_GRAPH, parameter).await
    }

    /// Wait out the last draw before committing; the device has no draw-complete signal
    pub async fn await_draw_complete(&self) {
        self.settle(self.timings.after_draw_complete()).await;
    }

    /// Print the current board `copies` times, then wait for the device
    pub async fn commit_job(&self, copies: u32) -> Result<(), SdkError> {
        let parameter = json!({
            "printData": null,
            "printerImageProcessingInfo": { "printQuantity": copies },
        });
        self.call(api::COMMIT_JOB, Some(parameter), self.timeouts.print())
            .await?;
        self.settle(self.timings.after_commit()).await;
        Ok(())
    }

    /// Best effort: a failure here is logged and never returned
    pub async fn end_job(&self) {
        match self
            .call(api::END_JOB, None, self.timeouts.default_timeout())
            .await
        {
            Ok(_) => debug!("Job ended"),
            Err(e) => warn!("endJob failed (ignored): {}", e),
        }
    }
}

/// `info` is a JSON string encoding `{ "<name>": <port> }`; ports may be strings
pub fn parse_usb_printers(info: Option<&Value>) -> Vec<PrinterHandle> {
    let Some(raw) = info.and_then(Value::as_str) else {
        return Vec::new();
    };
    let map = match serde_json::from_str::<serde_json::Map<String, Value>>(raw) {
        Ok(map) => map,
        Err(e) => {
            warn!("Failed to parse printer list: {}", e);
            return Vec::new();
        }
    };
    map.into_iter()
        .filter_map(|(name, port)| {
            let port = match &port {
                Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match port {
                Some(port) => Some(PrinterHandle::usb(name, port)),
                None => {
                    warn!(printer = %name, "Skipping printer with unreadable port");
                    None
                }
            }
        })
        .collect()
}

/// `info` is an array of `{ deviceName, tcpPort }`
pub fn parse_wifi_printers(info: Option<&Value>) -> Vec<PrinterHandle> {
    let entries = match info {
        Some(Value::Array(entries)) => entries.clone(),
        // some service builds double-encode the array
        Some(Value::String(raw)) => serde_json::from_str::<Vec<Value>>(raw).unwrap_or_default(),
        _ => return Vec::new(),
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("deviceName")?.as_str()?;
            let port = entry
                .get("tcpPort")
                .and_then(Value::as_u64)
                .and_then(|p| u32::try_from(p).ok())?;
            Some(PrinterHandle::wifi(name, port))
        })
        .collect()
}
