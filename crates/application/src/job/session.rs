use domain::error::JobError;
use domain::job::{JobOutcome, JobSpec, PrintJob};
use domain::label::{LabelBoard, LabelElement, LabelPage};
use domain::printer::PrinterHandle;
use domain::protocol::api;
use domain::settings::WorkaroundSettings;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::workaround::{self, DrawOp};
use crate::sdk::{RetryPolicy, SdkCommands};

/// Drives one print job through the device's required command order.
///
/// Every step checks the job phase before touching the network and records
/// the new phase only once the device accepted the call.
pub struct JobSession<'a> {
    commands: &'a SdkCommands,
    retry: &'a RetryPolicy,
    workarounds: &'a WorkaroundSettings,
    job: PrintJob,
}

impl<'a> JobSession<'a> {
    pub fn new(
        commands: &'a SdkCommands,
        retry: &'a RetryPolicy,
        workarounds: &'a WorkaroundSettings,
        job: PrintJob,
    ) -> Self {
        Self {
            commands,
            retry,
            workarounds,
            job,
        }
    }

    /// Run the job end to end on `printer`, which must already be selected.
    ///
    /// Once `startJob` succeeded, `endJob` is always attempted before
    /// returning, whatever happened in between.
    pub async fn run(
        commands: &'a SdkCommands,
        retry: &'a RetryPolicy,
        workarounds: &'a WorkaroundSettings,
        job_id: Uuid,
        printer: PrinterHandle,
        spec: &JobSpec,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        let copies = spec.total_copies();
        let (device_count, placeholder) = workaround::device_count(copies, workarounds);
        let job = PrintJob::new(
            printer,
            spec.density,
            spec.label_type,
            spec.print_mode,
            device_count,
        )
        .with_id(job_id);

        let mut session = Self::new(commands, retry, workarounds, job);
        session.start().await?;

        let result = session.print_pages(&spec.pages, placeholder, cancel).await;
        session.end().await;

        let job = session.job;
        match result {
            Ok(cancelled) => {
                info!(
                    job_id = %job.id,
                    printed = job.printed_count,
                    cancelled,
                    "Print job finished"
                );
                Ok(JobOutcome {
                    job_id: job.id,
                    printer: job.printer,
                    copies,
                    printed_labels: job.printed_count,
                    cancelled,
                })
            }
            Err(e) => {
                error!(job_id = %job.id, printed = job.printed_count, "Print job failed: {}", e);
                Err(e)
            }
        }
    }

    /// `startJob` with busy retries
    pub async fn start(&mut self) -> Result<(), JobError> {
        let next = self.job.check_start()?;
        let job = &self.job;
        info!(
            job_id = %job.id,
            printer = %job.printer,
            count = job.device_count,
            "Starting print job"
        );
        let commands = self.commands;
        let (density, label_type, print_mode, count) =
            (job.density, job.label_type, job.print_mode, job.device_count);
        self.retry
            .run(api::START_JOB, move || {
                commands.start_job(density, label_type, print_mode, count)
            })
            .await?;
        self.job.record_start(next);
        Ok(())
    }

    pub async fn init_board(&mut self, board: &LabelBoard) -> Result<(), JobError> {
        let next = self.job.check_board()?;
        self.commands.init_board(board).await?;
        self.job.record_board(next);
        Ok(())
    }

    /// Draw one element; a border or rectangle counts as its four lines
    pub async fn draw(&mut self, element: &LabelElement) -> Result<(), JobError> {
        for op in workaround::expand(element, self.workarounds) {
            let next = self.job.check_draw()?;
            let drawn = match &op {
                DrawOp::Text(el) => self.commands.draw_text(el).await,
                DrawOp::Barcode(el) => self.commands.draw_barcode(el).await,
                DrawOp::Qrcode(el) => self.commands.draw_qrcode(el).await,
                DrawOp::Image(el) => self.commands.draw_image(el).await,
                DrawOp::Line(el) => self.commands.draw_line(el).await,
                DrawOp::Graph(el) => self.commands.draw_graph(el).await,
            };
            drawn?;
            self.job.record_draw(next);
        }
        Ok(())
    }

    /// `commitJob`; placeholder commits pass `counted = false`
    pub async fn commit(&mut self, copies: u32, counted: bool) -> Result<(), JobError> {
        let next = self.job.check_commit()?;
        self.commands.await_draw_complete().await;
        self.commands.commit_job(copies).await?;
        self.job.record_commit(next, copies, counted);
        debug!(
            job_id = %self.job.id,
            elements = self.job.label_elements,
            copies,
            counted,
            "Label committed"
        );
        Ok(())
    }

    /// Best-effort `endJob`; a no-op unless a job is open on the device
    pub async fn end(&mut self) {
        match self.job.check_end() {
            Ok(next) => {
                self.commands.end_job().await;
                self.job.record_end(next);
            }
            Err(e) => debug!("Skipping endJob: {}", e),
        }
    }

    async fn print_placeholder(&mut self, board: &LabelBoard) -> Result<(), JobError> {
        debug!(job_id = %self.job.id, "Printing placeholder label");
        let text = workaround::placeholder_element(board, &self.workarounds.placeholder_text);
        self.init_board(board).await?;
        self.draw(&LabelElement::Text(text)).await?;
        self.commit(1, false).await
    }

    /// Returns whether the job stopped early because of `cancel`
    async fn print_pages(
        &mut self,
        pages: &[LabelPage],
        placeholder: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, JobError> {
        if placeholder {
            let Some(first) = pages.first() else {
                return Err(JobError::InvalidRequest("job has no label pages".to_string()));
            };
            self.print_placeholder(&first.board).await?;
        }

        for (index, page) in pages.iter().enumerate() {
            // only honoured between labels
            if cancel.is_cancelled() {
                warn!(job_id = %self.job.id, page = index, "Print job cancelled");
                return Ok(true);
            }
            self.init_board(&page.board).await?;
            for element in &page.elements {
                self.draw(element).await.map_err(|e| {
                    warn!(
                        job_id = %self.job.id,
                        page = index,
                        element = element.type_name(),
                        "Draw failed"
                    );
                    e
                })?;
            }
            self.commit(page.copies, true).await?;
        }
        Ok(false)
    }
}
