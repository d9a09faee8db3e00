pub mod api;
pub mod auth;
pub mod error;
pub mod state;

use application::PrinterService;
use infrastructure::BridgeConfig;
use state::AppState;
use std::sync::Arc;

pub fn setup_app_state(service: PrinterService, config: BridgeConfig) -> Arc<AppState> {
    Arc::new(AppState::new(service, config))
}
