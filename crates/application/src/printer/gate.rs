use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Device-wide single-flight flag.
///
/// The printer holds one job's state at a time, so every device-facing
/// operation takes a permit first and fails fast when one is out.
#[derive(Debug, Clone, Default)]
pub struct JobGate {
    busy: Arc<AtomicBool>,
}

impl JobGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another permit is alive
    pub fn try_acquire(&self) -> Option<JobPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped, on every exit path
#[derive(Debug)]
pub struct JobPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
