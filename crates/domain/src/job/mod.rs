mod phase;
mod print_job;
mod spec;

pub use phase::JobPhase;
pub use print_job::PrintJob;
pub use spec::{JobOutcome, JobSpec};
