use serde::{Deserialize, Serialize};

use crate::error::SequenceError;

/// Where a print job stands in the vendor's required command order.
///
/// `Idle → Started → BoardReady → Drawing → Committed → (BoardReady | Ended)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    #[default]
    Idle,
    Started,
    BoardReady,
    Drawing,
    Committed,
    Ended,
}

impl JobPhase {
    /// `startJob` accepted
    pub fn to_started(&self) -> Result<Self, SequenceError> {
        match self {
            Self::Idle => Ok(Self::Started),
            _ => Err(SequenceError::new("start job", *self)),
        }
    }

    /// `InitDrawingBoard` for the first label, or the next label after a commit
    pub fn to_board_ready(&self) -> Result<Self, SequenceError> {
        match self {
            Self::Started | Self::Committed => Ok(Self::BoardReady),
            _ => Err(SequenceError::new("init board", *self)),
        }
    }

    /// Any draw call
    pub fn to_drawing(&self) -> Result<Self, SequenceError> {
        match self {
            Self::BoardReady | Self::Drawing => Ok(Self::Drawing),
            _ => Err(SequenceError::new("draw", *self)),
        }
    }

    /// `commitJob`; an empty board may be committed
    pub fn to_committed(&self) -> Result<Self, SequenceError> {
        match self {
            Self::BoardReady | Self::Drawing => Ok(Self::Committed),
            _ => Err(SequenceError::new("commit", *self)),
        }
    }

    /// `endJob`, reachable from every phase after a successful start
    pub fn to_ended(&self) -> Result<Self, SequenceError> {
        match self {
            Self::Idle | Self::Ended => Err(SequenceError::new("end job", *self)),
            _ => Ok(Self::Ended),
        }
    }

    /// True while the device holds an open job that must be ended
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Idle | Self::Ended)
    }
}
