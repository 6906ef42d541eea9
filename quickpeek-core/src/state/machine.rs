//! Request validation against the panel state
//!
//! The panel is either asleep or prepared. Prepare is only legal while
//! asleep; Draw, Erase and Complete only while prepared.

use quickpeek_protocol::{QuickPeekMessage, Reason};

/// Sequencer run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerPhase {
    /// Not draining
    Idle,
    /// Draining the command queue
    Running,
}

impl SequencerPhase {
    pub fn from_in_progress(in_progress: bool) -> Self {
        if in_progress {
            SequencerPhase::Running
        } else {
            SequencerPhase::Idle
        }
    }
}

/// Reasons a request is rejected before reaching the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Draw, Erase or Complete without a preceding Prepare
    NotPrepared,
    /// Prepare while already prepared
    AlreadyPrepared,
    /// Draw buffer id above the configured maximum
    BufferIdOutOfRange,
    /// Erase rectangle with x2 <= x1 or y2 <= y1
    EmptyRect,
}

/// Check that `reason` is a legal transition from the current panel state
pub fn check_transition(prepared: bool, reason: Reason) -> Result<(), ValidationError> {
    match (prepared, reason) {
        (false, Reason::Prepare) => Ok(()),
        (true, Reason::Prepare) => Err(ValidationError::AlreadyPrepared),
        (true, Reason::Draw | Reason::Erase | Reason::Complete) => Ok(()),
        (false, Reason::Draw | Reason::Erase | Reason::Complete) => {
            Err(ValidationError::NotPrepared)
        }
    }
}

/// Check the request parameters
pub fn check_params(message: &QuickPeekMessage, max_buffer_id: u8) -> Result<(), ValidationError> {
    match message {
        QuickPeekMessage::Draw { buffer_id, .. } if *buffer_id > max_buffer_id => {
            Err(ValidationError::BufferIdOutOfRange)
        }
        QuickPeekMessage::Erase { rect, .. } if !rect.is_valid() => Err(ValidationError::EmptyRect),
        _ => Ok(()),
    }
}

/// Full validation: transition legality first, then parameters
pub fn validate(
    message: &QuickPeekMessage,
    prepared: bool,
    max_buffer_id: u8,
) -> Result<(), ValidationError> {
    check_transition(prepared, message.reason())?;
    check_params(message, max_buffer_id)
}
