use serde::Serialize;
use uuid::Uuid;

use super::phase::JobPhase;
use crate::error::SequenceError;
use crate::printer::PrinterHandle;

/// The single print job active on the device.
///
/// Phase checks run before the matching network call; the `record_*`
/// methods are applied only after the device accepted it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: Uuid,
    pub printer: PrinterHandle,
    pub density: u8,
    pub label_type: u8,
    pub print_mode: u8,
    /// Count passed to `startJob`, placeholder included
    pub device_count: u32,
    pub phase: JobPhase,
    /// Copies of real labels committed so far
    pub printed_count: u32,
    /// Successful draw calls on the current board
    pub label_elements: usize,
}

impl PrintJob {
    pub fn new(
        printer: PrinterHandle,
        density: u8,
        label_type: u8,
        print_mode: u8,
        device_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            printer,
            density,
            label_type,
            print_mode,
            device_count,
            phase: JobPhase::Idle,
            printed_count: 0,
            label_elements: 0,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn check_start(&self) -> Result<JobPhase, SequenceError> {
        self.phase.to_started()
    }

    pub fn check_board(&self) -> Result<JobPhase, SequenceError> {
        self.phase.to_board_ready()
    }

    pub fn check_draw(&self) -> Result<JobPhase, SequenceError> {
        self.phase.to_drawing()
    }

    pub fn check_commit(&self) -> Result<JobPhase, SequenceError> {
        self.phase.to_committed()
    }

    pub fn check_end(&self) -> Result<JobPhase, SequenceError> {
        self.phase.to_ended()
    }

    pub fn record_start(&mut self, next: JobPhase) {
        self.phase = next;
    }

    pub fn record_board(&mut self, next: JobPhase) {
        self.phase = next;
        self.label_elements = 0;
    }

    pub fn record_draw(&mut self, next: JobPhase) {
        self.phase = next;
        self.label_elements += 1;
    }

    /// `counted` is false for the placeholder label
    pub fn record_commit(&mut self, next: JobPhase, copies: u32, counted: bool) {
        self.phase = next;
        if counted {
            self.printed_count += copies;
        }
    }

    pub fn record_end(&mut self, next: JobPhase) {
        self.phase = next;
    }
}
