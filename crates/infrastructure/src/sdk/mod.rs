//! Connection to the vendor print service: WebSocket transport, reply
//! correlation and an in-memory fake for tests.

pub mod correlator;
pub mod mock_transport;
pub mod websocket;

pub use correlator::CallCorrelator;
pub use mock_transport::{MockTransport, SentFrame};
pub use websocket::WebSocketTransport;

use std::sync::{Mutex, MutexGuard, PoisonError};

const LOG_PREVIEW_CHARS: usize = 200;

/// Shorten a frame for log output without splitting a UTF-8 character
pub(crate) fn preview(frame: &str) -> &str {
    match frame.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &frame[..idx],
        None => frame,
    }
}

/// Lock a std mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
