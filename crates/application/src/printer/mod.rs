pub mod gate;
pub mod service;

pub use gate::{JobGate, JobPermit};
pub use service::{PrinterService, PrinterSettings, PrinterStatus};
