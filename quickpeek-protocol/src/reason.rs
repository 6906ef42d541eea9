//! Request reasons and ack codes as carried in the status and ack frames

/// Why the companion controller raised its interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reason {
    /// Bring the panel into a drawable state
    Prepare,
    /// Show a pre-rendered buffer
    Draw,
    /// Clear a rectangle
    Erase,
    /// Peek sequence finished, panel may go back to sleep
    Complete,
}

// Wire format values (4-bit field)
const REASON_PREPARE: u8 = 0x01;
const REASON_DRAW: u8 = 0x02;
const REASON_ERASE: u8 = 0x03;
const REASON_COMPLETE: u8 = 0x04;

/// Reason value used in acks that do not refer to a decoded request
pub const REASON_NONE: u8 = 0x00;

impl Reason {
    /// Parse a reason from its 4-bit wire value
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            REASON_PREPARE => Some(Reason::Prepare),
            REASON_DRAW => Some(Reason::Draw),
            REASON_ERASE => Some(Reason::Erase),
            REASON_COMPLETE => Some(Reason::Complete),
            _ => None,
        }
    }

    /// Convert to the 4-bit wire value
    pub fn to_bits(self) -> u8 {
        match self {
            Reason::Prepare => REASON_PREPARE,
            Reason::Draw => REASON_DRAW,
            Reason::Erase => REASON_ERASE,
            Reason::Complete => REASON_COMPLETE,
        }
    }
}

/// Per-request outcome reported back to the companion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckCode {
    /// Request applied
    Ack,
    /// Request superseded by a reset and never applied
    Done,
    /// Request rejected or failed
    Invalid,
    /// Prepare succeeded after the panel recovered from an ESD event
    EsdRecovered,
}

// Wire format values (2-bit field)
const ACK_ACK: u8 = 0x00;
const ACK_DONE: u8 = 0x01;
const ACK_INVALID: u8 = 0x02;
const ACK_ESD_RECOVERED: u8 = 0x03;

impl AckCode {
    /// Parse an ack code from its 2-bit wire value
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            ACK_ACK => AckCode::Ack,
            ACK_DONE => AckCode::Done,
            ACK_INVALID => AckCode::Invalid,
            _ => AckCode::EsdRecovered,
        }
    }

    /// Convert to the 2-bit wire value
    pub fn to_bits(self) -> u8 {
        match self {
            AckCode::Ack => ACK_ACK,
            AckCode::Done => ACK_DONE,
            AckCode::Invalid => ACK_INVALID,
            AckCode::EsdRecovered => ACK_ESD_RECOVERED,
        }
    }
}
