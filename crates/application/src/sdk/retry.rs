use std::future::Future;
use std::time::Duration;

use domain::error::SdkError;
use domain::settings::RetrySettings;
use tokio::time::sleep;
use tracing::warn;

/// Retries the vendor's "printer busy" reply with linear backoff.
///
/// Attempt `n` that comes back busy waits `n * base_interval` before the
/// next one. Any other error ends the loop at once.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the given 1-based attempt came back busy
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_interval * attempt
    }

    pub async fn run<T, F, Fut>(&self, api_name: &str, mut op: F) -> Result<T, SdkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SdkError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_device_busy() && attempt < self.max_attempts => {
                    let wait = self.backoff(attempt);
                    warn!(
                        api_name = %api_name,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Printer busy, retrying"
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, settings.base_interval())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}
