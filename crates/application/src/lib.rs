//! Application layer - Use cases and business workflows

pub mod job;
pub mod printer;
pub mod sdk;

pub use job::JobSession;
pub use printer::{PrinterService, PrinterSettings, PrinterStatus};
pub use sdk::{RetryPolicy, SdkCommands};
