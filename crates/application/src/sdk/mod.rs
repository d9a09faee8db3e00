pub mod commands;
pub mod params;
pub mod retry;

pub use commands::SdkCommands;
pub use retry::RetryPolicy;
