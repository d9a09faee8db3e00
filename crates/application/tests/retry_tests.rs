use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use application::sdk::{RetryPolicy, SdkCommands};
use domain::error::SdkError;
use domain::settings::{CallTimeouts, SdkTimings};
use infrastructure::sdk::{CallCorrelator, MockTransport};
use tokio::time::Instant;

fn setup() -> (Arc<MockTransport>, SdkCommands) {
    let (transport, inbound) = MockTransport::new();
    let correlator = Arc::new(CallCorrelator::new(transport.clone(), inbound));
    let commands = SdkCommands::new(correlator, SdkTimings::immediate(), CallTimeouts::default());
    (transport, commands)
}

/// Answer `startJob` with `code` for the first `failures` attempts
fn fail_start_job(transport: &MockTransport, failures: u32, code: i64) {
    let attempts = AtomicU32::new(0);
    transport.set_responder(move |req| {
        if req.api_name == "startJob" && attempts.fetch_add(1, Ordering::SeqCst) < failures {
            return Some(MockTransport::error_reply("startJob", code, "printer busy"));
        }
        Some(MockTransport::ok_reply(&req.api_name))
    });
}

fn offsets(transport: &MockTransport, started: Instant) -> Vec<Duration> {
    transport.sent().iter().map(|f| f.at - started).collect()
}

#[tokio::test(start_paused = true)]
async fn test_busy_twice_then_success() {
    let (transport, commands) = setup();
    fail_start_job(&transport, 2, -2);
    let policy = RetryPolicy::default();
    let started = Instant::now();

    policy
        .run("startJob", || commands.start_job(3, 1, 1, 2))
        .await
        .unwrap();

    assert_eq!(
        offsets(&transport, started),
        vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(3)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_busy_error() {
    let (transport, commands) = setup();
    fail_start_job(&transport, u32::MAX, -2);
    let policy = RetryPolicy::default();

    let err = policy
        .run("startJob", || commands.start_job(3, 1, 1, 2))
        .await
        .unwrap_err();

    assert!(err.is_device_busy());
    assert_eq!(transport.sent().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_other_codes_are_not_retried() {
    let (transport, commands) = setup();
    fail_start_job(&transport, u32::MAX, 7);
    let policy = RetryPolicy::default();

    let err = policy
        .run("startJob", || commands.start_job(3, 1, 1, 2))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(7));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_not_retried() {
    let (transport, commands) = setup();
    transport.set_responder(|_| None);
    let policy = RetryPolicy::default();

    let err = policy
        .run("startJob", || commands.start_job(3, 1, 1, 2))
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Timeout { .. }));
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn test_backoff_is_linear() {
    let policy = RetryPolicy::new(3, Duration::from_millis(500));
    assert_eq!(policy.backoff(1), Duration::from_millis(500));
    assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
}
