use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::label::LabelPage;
use crate::printer::PrinterHandle;

/// Everything needed to run one print job end to end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Explicit target; otherwise the service resolves one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer: Option<PrinterHandle>,
    pub density: u8,
    pub label_type: u8,
    pub print_mode: u8,
    pub pages: Vec<LabelPage>,
}

impl JobSpec {
    /// Logical number of labels the caller asked for, saturating at `u32::MAX`
    pub fn total_copies(&self) -> u32 {
        self.pages
            .iter()
            .fold(0u32, |total, p| total.saturating_add(p.copies))
    }

    fn checked_total_copies(&self) -> Option<u32> {
        self.pages
            .iter()
            .try_fold(0u32, |total, p| total.checked_add(p.copies))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.pages.is_empty() {
            return Err("job has no label pages".to_string());
        }
        if !(1..=15).contains(&self.density) {
            return Err(format!("density must be 1-15, got {}", self.density));
        }
        self.pages.iter().try_for_each(LabelPage::validate)?;
        // one spare for the single-copy placeholder
        if self
            .checked_total_copies()
            .and_then(|n| n.checked_add(1))
            .is_none()
        {
            return Err("total copies exceed what the device can count".to_string());
        }
        Ok(())
    }
}

/// Result reported for a finished job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub printer: PrinterHandle,
    /// Logical copies requested
    pub copies: u32,
    /// Real labels committed; never includes the placeholder
    pub printed_labels: u32,
    pub cancelled: bool,
}
