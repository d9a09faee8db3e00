use std::sync::{Arc, Mutex, PoisonError, RwLock};

use domain::error::{JobError, SdkError};
use domain::event::DeviceEvent;
use domain::job::{JobOutcome, JobSpec};
use domain::printer::{ConnectionKind, PrinterHandle};
use domain::settings::{CallTimeouts, RetrySettings, SdkTimings, WorkaroundSettings};
use domain::transport::ConnectionState;
use infrastructure::BridgeConfig;
use infrastructure::sdk::CallCorrelator;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::gate::{JobGate, JobPermit};
use crate::job::JobSession;
use crate::sdk::{RetryPolicy, SdkCommands};

/// Timing and workaround knobs for the service
#[derive(Debug, Clone, Default)]
pub struct PrinterSettings {
    pub timings: SdkTimings,
    pub timeouts: CallTimeouts,
    pub retry: RetrySettings,
    pub workarounds: WorkaroundSettings,
}

impl From<&BridgeConfig> for PrinterSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            timings: config.timings.clone(),
            timeouts: config.timeouts.clone(),
            retry: config.retry.clone(),
            workarounds: config.workarounds.clone(),
        }
    }
}

/// Snapshot for status endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    #[serde(rename = "wsConnected")]
    pub connected: bool,
    pub connection_state: ConnectionState,
    pub current_printer: Option<PrinterHandle>,
    pub job_active: bool,
}

struct Inner {
    commands: SdkCommands,
    retry: RetryPolicy,
    workarounds: WorkaroundSettings,
    gate: JobGate,
    /// Last printer a job or connect succeeded with
    last_printer: RwLock<Option<PrinterHandle>>,
    /// Cancellation handle of the running job
    current_job: Mutex<Option<(Uuid, CancellationToken)>>,
}

/// The surface the HTTP bridge talks to.
///
/// All device-facing operations share one single-flight gate. Jobs run on
/// their own task so a caller that goes away cannot leave the device mid-job.
#[derive(Clone)]
pub struct PrinterService {
    inner: Arc<Inner>,
}

impl PrinterService {
    pub fn new(correlator: Arc<CallCorrelator>, settings: PrinterSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                commands: SdkCommands::new(correlator, settings.timings, settings.timeouts),
                retry: RetryPolicy::from(&settings.retry),
                workarounds: settings.workarounds,
                gate: JobGate::new(),
                last_printer: RwLock::new(None),
                current_job: Mutex::new(None),
            }),
        }
    }

    fn acquire(&self) -> Result<JobPermit, JobError> {
        self.inner.gate.try_acquire().ok_or(JobError::Busy)
    }

    fn ensure_connected(&self) -> Result<(), JobError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SdkError::NotConnected.into())
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.commands.correlator().is_connected()
    }

    pub fn current_printer(&self) -> Option<PrinterHandle> {
        self.inner
            .last_printer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember_printer(&self, printer: &PrinterHandle) {
        *self
            .inner
            .last_printer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(printer.clone());
    }

    pub fn status(&self) -> PrinterStatus {
        let correlator = self.inner.commands.correlator();
        PrinterStatus {
            connected: correlator.is_connected(),
            connection_state: correlator.connection_state(),
            current_printer: self.current_printer(),
            job_active: self.inner.gate.is_busy(),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.commands.correlator().subscribe_events()
    }

    pub async fn init_sdk(&self) -> Result<(), JobError> {
        let _permit = self.acquire()?;
        self.inner.commands.init_sdk().await?;
        Ok(())
    }

    pub async fn scan_printers(&self, kind: ConnectionKind) -> Result<Vec<PrinterHandle>, JobError> {
        let _permit = self.acquire()?;
        self.ensure_connected()?;
        let printers = match kind {
            ConnectionKind::Usb => self.inner.commands.scan_usb_printers().await?,
            ConnectionKind::Wifi => self.inner.commands.scan_wifi_printers().await?,
        };
        info!(kind = kind.as_str(), count = printers.len(), "Printer scan finished");
        Ok(printers)
    }

    pub async fn connect_printer(&self, printer: &PrinterHandle) -> Result<(), JobError> {
        let _permit = self.acquire()?;
        self.inner.commands.select_printer(printer).await?;
        self.remember_printer(printer);
        Ok(())
    }

    pub async fn close_printer(&self) -> Result<(), JobError> {
        let _permit = self.acquire()?;
        self.inner.commands.close_printer().await?;
        Ok(())
    }

    pub async fn run_job(&self, spec: JobSpec) -> Result<JobOutcome, JobError> {
        self.run_job_with_id(Uuid::new_v4(), spec).await
    }

    /// Run one job under the gate. Rejections happen before anything is sent.
    pub async fn run_job_with_id(
        &self,
        job_id: Uuid,
        spec: JobSpec,
    ) -> Result<JobOutcome, JobError> {
        spec.validate().map_err(JobError::InvalidRequest)?;
        let permit = self.acquire()?;
        self.ensure_connected()?;

        let cancel = CancellationToken::new();
        *self
            .inner
            .current_job
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((job_id, cancel.clone()));

        let service = self.clone();
        let task = tokio::spawn(async move {
            let result = service.execute(job_id, &spec, &cancel).await;
            service.clear_current_job(job_id);
            drop(permit);
            result
        });

        task.await.unwrap_or_else(|e| {
            error!(job_id = %job_id, "Print job task aborted: {}", e);
            Err(JobError::Aborted(e.to_string()))
        })
    }

    async fn execute(
        &self,
        job_id: Uuid,
        spec: &JobSpec,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        let inner = &self.inner;
        inner.commands.init_sdk().await?;

        let printer = self.resolve_printer(spec.printer.clone()).await?;
        inner.commands.select_printer(&printer).await?;
        self.remember_printer(&printer);

        JobSession::run(
            &inner.commands,
            &inner.retry,
            &inner.workarounds,
            job_id,
            printer,
            spec,
            cancel,
        )
        .await
    }

    /// Explicit printer, else first USB device, else the last one that worked
    async fn resolve_printer(
        &self,
        explicit: Option<PrinterHandle>,
    ) -> Result<PrinterHandle, JobError> {
        if let Some(printer) = explicit {
            return Ok(printer);
        }
        let found = self.inner.commands.scan_usb_printers().await?;
        if let Some(printer) = found.into_iter().next() {
            return Ok(printer);
        }
        // a rescan right after a job can come back empty
        match self.current_printer() {
            Some(printer) => {
                warn!(printer = %printer, "No printers found, using last known printer");
                Ok(printer)
            }
            None => Err(JobError::NoPrinter),
        }
    }

    fn clear_current_job(&self, job_id: Uuid) {
        let mut current = self
            .inner
            .current_job
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|(id, _)| *id == job_id) {
            *current = None;
        }
    }

    /// Ask the running job to stop at the next label boundary
    pub fn cancel_job(&self) -> bool {
        let current = self
            .inner
            .current_job
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some((job_id, token)) if !token.is_cancelled() => {
                info!(job_id = %job_id, "Cancellation requested");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Close the transport; used on process shutdown
    pub async fn shutdown(&self) {
        self.inner.commands.correlator().transport().disconnect().await;
    }
}
