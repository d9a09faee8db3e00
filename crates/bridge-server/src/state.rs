use application::PrinterService;
use infrastructure::BridgeConfig;

/// Shared by every handler
pub struct AppState {
    pub service: PrinterService,
    pub config: BridgeConfig,
}

impl AppState {
    pub fn new(service: PrinterService, config: BridgeConfig) -> Self {
        Self { service, config }
    }
}
