//! Domain layer - types and rules for driving a Jingchen label printer
//!
//! This crate contains:
//! - Wire frames of the vendor print service protocol
//! - Transport trait and connection state
//! - Label pages and drawable elements
//! - The print job phase machine
//! - Device events and the error taxonomy
//!
//! Nothing here performs I/O.

pub mod error;
pub mod event;
pub mod job;
pub mod label;
pub mod printer;
pub mod protocol;
pub mod settings;
pub mod transport;

// Re-export commonly used types
pub use error::{JobError, SdkError, SequenceError};
pub use event::DeviceEvent;
pub use job::{JobOutcome, JobPhase, JobSpec, PrintJob};
pub use printer::{ConnectionKind, PrinterHandle};
pub use settings::{CallTimeouts, RetrySettings, SdkTimings, WorkaroundSettings};
pub use transport::{ConnectionState, SdkTransport, TransportEvent};
