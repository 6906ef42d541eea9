//! Companion controller register map

/// Registers used by the quick-peek exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Ownership of peek framing (write [`HANDOVER`] or [`TAKEBACK`])
    PeekStatus = 0x1D,
    /// Panel state and request reason for the pending interrupt
    PeekEvent = 0x1E,
    /// Buffer id and optional origin for a Draw request
    DrawParams = 0x1F,
    /// Rectangle for an Erase request
    EraseParams = 0x20,
    /// Ack frame for the last processed request
    PeekAck = 0x21,
    /// Companion still owns in-flight peek work
    CompanionBusy = 0x22,
}

/// Host owns peek framing
pub const HANDOVER: u8 = 1;

/// Host reclaims the panel from the companion
pub const TAKEBACK: u8 = 0;

impl Register {
    /// Get the register address byte
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Fixed frame length exchanged with this register
    pub const fn frame_len(self) -> usize {
        match self {
            Register::PeekStatus => 1,
            Register::PeekEvent => crate::frame::STATUS_FRAME_LEN,
            Register::DrawParams => crate::frame::DRAW_PARAMS_LEN,
            Register::EraseParams => crate::frame::ERASE_PARAMS_LEN,
            Register::PeekAck => crate::frame::ACK_FRAME_LEN,
            Register::CompanionBusy => 1,
        }
    }
}
